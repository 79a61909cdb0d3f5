pub mod ambient;
pub mod cli;
pub mod config;
pub mod ease;
pub mod events;
pub mod frame;
pub mod frame_registry;
pub mod input;
pub mod media;
pub mod navigator;
pub mod session;
pub mod store;
pub mod store_sync;
pub mod time;

pub use navigator::NavCommand;
pub use session::Session;

/// Installs the process-wide logger. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("diorama=info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
