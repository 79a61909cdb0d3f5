use anyhow::{anyhow, Result};
use diorama::cli::ShellArgs;
use diorama::config::SessionConfig;
use diorama::input::InputMap;
use diorama::navigator::{CameraNavigator, NavCommand};
use diorama::session::Session;
use diorama::time::Clock;
use log::{info, warn};
use std::thread;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(16);
const ARRIVAL_EPSILON: f32 = 0.05;
const MAX_SETTLE_TICKS: u32 = 600;

fn main() {
    diorama::init_logging();
    let args = match ShellArgs::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(args) {
        eprintln!("Presentation error: {err:?}");
        std::process::exit(1);
    }
}

fn run(args: ShellArgs) -> Result<()> {
    let mut config = match args.config_path() {
        Some(path) => SessionConfig::load_or_default(path),
        None => SessionConfig::default(),
    };
    let overrides = args.config_overrides();
    if !overrides.is_empty() {
        info!("[shell] command line overrides: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);

    let bindings = match args.bindings_path() {
        Some(path) => InputMap::load_or_default(path),
        None => InputMap::default(),
    };

    let mut session = if args.reset() {
        Session::reset(&config)?
    } else {
        Session::restore(&config)?
    };

    print_deck(&session);
    for event in session.drain_events() {
        info!("[deck] {event}");
    }

    if !args.skip_tour() {
        run_tour(&mut session, &bindings)?;
    }

    session.flush();
    Ok(())
}

fn print_deck(session: &Session) {
    println!("Deck ({} frames, store mirrored in background):", session.frames().len());
    for (index, frame) in session.frames().iter().enumerate() {
        let marker = if index == session.active_index() { '>' } else { ' ' };
        println!(
            "{marker} [{index}] {:<12} {:<10} {:<28} at ({:>6.1}, {:>5.1}, {:>6.1})",
            frame.title,
            frame.content.kind.label(),
            frame.display_name,
            frame.position.x,
            frame.position.y,
            frame.position.z,
        );
    }
    let ambient = session.ambient();
    println!(
        "Ambient: {} logo(s), orbit distance {:.1}",
        ambient.logos.len(),
        ambient.logo_distance
    );
}

/// Walks the whole deck once, gliding the camera frame to frame in real
/// time the way a presenter stepping through would. Key presses go through
/// the bindings, same as they would from a real front end.
fn run_tour(session: &mut Session, bindings: &InputMap) -> Result<()> {
    println!("Touring the deck:");
    let mut clock = Clock::new();
    press(session, bindings, "home", NavCommand::Home);
    let stops = session.frames().len();
    for stop in 0..stops {
        if stop > 0 {
            press(session, bindings, "space", NavCommand::Next);
        }
        let ticks = settle(session, &mut clock);
        let frame = session
            .active_frame()
            .ok_or_else(|| anyhow!("deck unexpectedly empty during tour"))?;
        let pose = session.camera_pose();
        println!(
            "  [{stop}] {:<12} settled after {ticks} ticks, camera at ({:.2}, {:.2}, {:.2})",
            frame.title, pose.position.x, pose.position.y, pose.position.z
        );
    }
    for event in session.drain_events() {
        info!("[deck] {event}");
    }
    Ok(())
}

fn press(session: &mut Session, bindings: &InputMap, key: &str, fallback: NavCommand) -> usize {
    match bindings.command_for_key(key) {
        Some(command) => session.handle_command(command),
        None => {
            warn!("[input] no binding for '{key}'; applying '{}' directly", fallback.label());
            session.handle_command(fallback)
        }
    }
}

fn settle(session: &mut Session, clock: &mut Clock) -> u32 {
    for tick in 0..MAX_SETTLE_TICKS {
        thread::sleep(TICK_INTERVAL);
        clock.tick();
        session.tick(clock.delta_seconds());
        let Some(frame) = session.active_frame() else {
            return tick;
        };
        let target = CameraNavigator::target_pose(frame);
        if session.camera_pose().position.distance(target.position) < ARRIVAL_EPSILON {
            return tick + 1;
        }
    }
    MAX_SETTLE_TICKS
}
