use crate::ambient::DEFAULT_LOGO_DISTANCE;
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_data_dir")]
    pub data_dir: PathBuf,
}

impl StoreConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("deck_store")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: Self::default_data_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "CameraConfig::default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
}

impl CameraConfig {
    const fn default_smoothing() -> f32 {
        0.4
    }

    const fn default_fov_y_degrees() -> f32 {
        50.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        1000.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smoothing: Self::default_smoothing(),
            fov_y_degrees: Self::default_fov_y_degrees(),
            near: Self::default_near(),
            far: Self::default_far(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmbientConfig {
    #[serde(default = "AmbientConfig::default_logo_distance")]
    pub logo_distance: f32,
}

impl AmbientConfig {
    const fn default_logo_distance() -> f32 {
        DEFAULT_LOGO_DISTANCE
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self { logo_distance: Self::default_logo_distance() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub ambient: AmbientConfig,
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("[config] load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SessionOverrides) {
        if let Some(data_dir) = &overrides.data_dir {
            self.store.data_dir = data_dir.clone();
        }
        if let Some(smoothing) = overrides.smoothing {
            self.camera.smoothing = smoothing;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub data_dir: Option<PathBuf>,
    pub smoothing: Option<f32>,
}

impl SessionOverrides {
    pub fn is_empty(&self) -> bool {
        self.data_dir.is_none() && self.smoothing.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.data_dir.is_some() {
            fields.push("data_dir");
        }
        if self.smoothing.is_some() {
            fields.push("smoothing");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SessionConfig::default();
        assert_eq!(config.store.data_dir, PathBuf::from("deck_store"));
        assert_eq!(config.camera.smoothing, 0.4);
        assert_eq!(config.camera.fov_y_degrees, 50.0);
        assert_eq!(config.ambient.logo_distance, DEFAULT_LOGO_DISTANCE);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"camera": {"smoothing": 0.8}}"#).unwrap();
        assert_eq!(config.camera.smoothing, 0.8);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.store.data_dir, PathBuf::from("deck_store"));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = SessionConfig::default();
        let overrides = SessionOverrides {
            data_dir: Some(PathBuf::from("/tmp/deck")),
            smoothing: Some(0.2),
        };
        config.apply_overrides(&overrides);
        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/deck"));
        assert_eq!(config.camera.smoothing, 0.2);
        assert_eq!(overrides.applied_fields(), vec!["data_dir", "smoothing"]);
        assert!(!overrides.is_empty());
    }
}
