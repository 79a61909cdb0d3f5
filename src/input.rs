use crate::navigator::NavCommand;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Maps presenter key names to navigation commands. Key names are
/// normalized to lowercase, so callers can forward whatever their front
/// end reports.
#[derive(Debug, Clone)]
pub struct InputMap {
    key_to_command: HashMap<String, NavCommand>,
}

impl InputMap {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<InputConfigFile>(&contents) {
                Ok(config) => Self::from_config(config, &path.display().to_string()),
                Err(err) => {
                    warn!(
                        "[input] Failed to parse {}: {err}. Falling back to default bindings.",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                warn!(
                    "[input] Failed to read {}: {err}. Falling back to default bindings.",
                    path.display()
                );
                Self::default()
            }
        }
    }

    fn from_config(config: InputConfigFile, origin: &str) -> Self {
        Self::with_overrides(config.into_overrides(origin))
    }

    fn with_overrides(overrides: HashMap<NavCommand, Vec<String>>) -> Self {
        let mut command_map = Self::default_command_map();
        for (command, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            command_map.insert(command, keys);
        }
        Self::from_command_map(command_map)
    }

    fn default_command_map() -> HashMap<NavCommand, Vec<String>> {
        let mut map = HashMap::new();
        map.insert(NavCommand::Next, vec!["arrow_right".into(), "space".into()]);
        map.insert(NavCommand::Previous, vec!["arrow_left".into()]);
        map.insert(NavCommand::Home, vec!["home".into()]);
        map
    }

    fn from_command_map(command_map: HashMap<NavCommand, Vec<String>>) -> Self {
        let mut key_to_command = HashMap::new();
        for (command, keys) in command_map {
            for key in keys {
                key_to_command.insert(key, command);
            }
        }
        Self { key_to_command }
    }

    pub fn command_for_key(&self, key: &str) -> Option<NavCommand> {
        let normalized = key.trim().to_lowercase();
        self.key_to_command.get(&normalized).copied()
    }
}

impl Default for InputMap {
    fn default() -> Self {
        Self::from_command_map(Self::default_command_map())
    }
}

fn normalize_key(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

#[derive(Debug, Deserialize)]
struct InputConfigFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

impl InputConfigFile {
    fn into_overrides(self, origin: &str) -> HashMap<NavCommand, Vec<String>> {
        let mut overrides = HashMap::new();
        for (command_name, keys) in self.bindings {
            let name = command_name.trim().to_lowercase();
            match NavCommand::from_name(&name) {
                Some(command) => {
                    let mut parsed = Vec::new();
                    for key in keys {
                        match normalize_key(&key) {
                            Some(normalized) => parsed.push(normalized),
                            None => warn!(
                                "[input] {origin}: unusable key '{key}' for command '{command_name}', ignoring."
                            ),
                        }
                    }
                    if parsed.is_empty() {
                        warn!(
                            "[input] {origin}: command '{command_name}' has no valid keys, keeping defaults."
                        );
                        continue;
                    }
                    overrides.insert(command, parsed);
                }
                None => {
                    warn!("[input] {origin}: unknown command '{command_name}', ignoring.")
                }
            }
        }
        overrides
    }
}
