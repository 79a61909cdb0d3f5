use crate::config::SessionOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellArgs {
    config: Option<PathBuf>,
    bindings: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    smoothing: Option<f32>,
    reset: bool,
    skip_tour: bool,
}

impl ShellArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ShellArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            match flag {
                "--reset" => {
                    parsed.reset = true;
                    continue;
                }
                "--skip-tour" => {
                    parsed.skip_tour = true;
                    continue;
                }
                _ => {}
            }
            if !flag.starts_with("--") {
                bail!(
                    "Unexpected argument '{flag}'. Use --config/--data-dir/--smoothing with values."
                );
            }
            let key = &flag[2..];
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?
                .as_ref()
                .to_string();
            match key {
                "config" => {
                    parsed.config = Some(PathBuf::from(value));
                }
                "bindings" => {
                    parsed.bindings = Some(PathBuf::from(value));
                }
                "data-dir" => {
                    parsed.data_dir = Some(PathBuf::from(value));
                }
                "smoothing" => {
                    let smoothing = value
                        .parse::<f32>()
                        .with_context(|| format!("Invalid smoothing '{value}'"))?;
                    if smoothing <= 0.0 {
                        bail!("Invalid smoothing '{value}'. Expected a positive number of seconds.");
                    }
                    parsed.smoothing = Some(smoothing);
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --bindings, --data-dir, --smoothing, --reset, --skip-tour."
                ),
            }
        }
        Ok(parsed)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn bindings_path(&self) -> Option<&PathBuf> {
        self.bindings.as_ref()
    }

    pub fn reset(&self) -> bool {
        self.reset
    }

    pub fn skip_tour(&self) -> bool {
        self.skip_tour
    }

    pub fn config_overrides(&self) -> SessionOverrides {
        SessionOverrides { data_dir: self.data_dir.clone(), smoothing: self.smoothing }
    }

    #[cfg(test)]
    fn as_tuple(&self) -> (Option<&PathBuf>, Option<&PathBuf>, Option<f32>, bool, bool) {
        (
            self.config.as_ref(),
            self.data_dir.as_ref(),
            self.smoothing,
            self.reset,
            self.skip_tour,
        )
    }
}
