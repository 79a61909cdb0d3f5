use crate::ambient::{AmbientSettings, Logo, DEFAULT_LOGO_DISTANCE};
use crate::frame::{ContentKind, Frame, FrameId};
use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Key the single ambient-settings record is filed under.
pub const SETTINGS_KEY: &str = "ambient";

/// Prefix of locators that point at payload files inside the store.
pub const MEDIA_PREFIX: &str = "media/";

const FRAMES_DIR: &str = "frames";
const MEDIA_DIR: &str = "media";
const SETTINGS_DIR: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentData {
    pub kind: ContentKind,
    pub locator: String,
}

/// Durable form of one frame. Transient display handles never belong here;
/// payload-backed content is written under a store media key instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub id: FrameId,
    #[serde(default)]
    pub position: Vec3Data,
    #[serde(default)]
    pub rotation: Vec3Data,
    #[serde(default)]
    pub title: String,
    pub content: ContentData,
    #[serde(default)]
    pub display_name: String,
}

impl FrameRecord {
    pub fn from_frame(frame: &Frame) -> Self {
        let locator = if frame.content.payload.is_some() {
            frame_media_key(frame.id)
        } else {
            frame.content.locator.clone()
        };
        Self {
            id: frame.id,
            position: frame.position.into(),
            rotation: frame.rotation.into(),
            title: frame.title.clone(),
            content: ContentData { kind: frame.content.kind, locator },
            display_name: frame.display_name.clone(),
        }
    }
}

fn default_logo_distance() -> f32 {
    DEFAULT_LOGO_DISTANCE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoRecord {
    pub id: Uuid,
    pub content: ContentData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    #[serde(default)]
    pub phase: f32,
    #[serde(default)]
    pub angular_speed: f32,
}

impl LogoRecord {
    pub fn from_logo(logo: &Logo) -> Self {
        let locator = if logo.content.payload.is_some() {
            logo_media_key(logo.id)
        } else {
            logo.content.locator.clone()
        };
        Self {
            id: logo.id,
            content: ContentData { kind: logo.content.kind, locator },
            aspect_ratio: logo.aspect_ratio,
            phase: logo.phase,
            angular_speed: logo.angular_speed,
        }
    }
}

/// Durable form of the ambient settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientRecord {
    #[serde(default = "default_logo_distance")]
    pub distance: f32,
    #[serde(default)]
    pub items: Vec<LogoRecord>,
}

impl AmbientRecord {
    pub fn from_settings(settings: &AmbientSettings) -> Self {
        Self {
            distance: settings.logo_distance,
            items: settings.logos.iter().map(LogoRecord::from_logo).collect(),
        }
    }
}

impl Default for AmbientRecord {
    fn default() -> Self {
        Self { distance: default_logo_distance(), items: Vec::new() }
    }
}

pub fn frame_media_key(id: FrameId) -> String {
    format!("{MEDIA_PREFIX}{id}")
}

pub fn logo_media_key(id: Uuid) -> String {
    format!("{MEDIA_PREFIX}logo-{id}")
}

fn valid_media_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Directory-backed record store. Frame records live under `frames/`, raw
/// payloads under `media/`, settings under `settings/`; every write
/// replaces the whole keyed file, so the latest write wins.
pub struct DeckStore {
    root: PathBuf,
}

impl DeckStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [FRAMES_DIR, MEDIA_DIR, SETTINGS_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("Creating store directory {}", path.display()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn frame_path(&self, id: FrameId) -> PathBuf {
        self.root.join(FRAMES_DIR).join(format!("{id}.json"))
    }

    fn settings_path(&self, key: &str) -> PathBuf {
        self.root.join(SETTINGS_DIR).join(format!("{key}.json"))
    }

    fn media_path(&self, key: &str) -> Result<PathBuf> {
        let Some(stem) = key.strip_prefix(MEDIA_PREFIX) else {
            bail!("'{key}' is not a media key");
        };
        if !valid_media_stem(stem) {
            bail!("media key '{key}' contains unexpected characters");
        }
        Ok(self.root.join(MEDIA_DIR).join(stem))
    }

    /// Whether a locator names a payload inside this store.
    pub fn is_media_key(locator: &str) -> bool {
        locator
            .strip_prefix(MEDIA_PREFIX)
            .is_some_and(valid_media_stem)
    }

    pub fn put_frame(&self, record: &FrameRecord) -> Result<()> {
        let path = self.frame_path(record.id);
        let json = serde_json::to_string_pretty(record)
            .with_context(|| format!("Encoding frame record {}", record.id))?;
        fs::write(&path, json.as_bytes())
            .with_context(|| format!("Writing frame record {}", path.display()))
    }

    /// Reads every frame record in the store. Unreadable files are skipped
    /// with a warning so one corrupt record cannot take the deck down.
    pub fn load_frames(&self) -> Result<Vec<FrameRecord>> {
        let dir = self.root.join(FRAMES_DIR);
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Reading store directory {}", dir.display()))?;
        let mut records = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Reading store directory {}", dir.display()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!("[store] skipping unreadable frame record {}: {err:#}", path.display());
                }
            }
        }
        Ok(records)
    }

    /// Removes a frame record together with its payload file, if any.
    pub fn delete_frame(&self, id: FrameId) -> Result<()> {
        let path = self.frame_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Deleting frame record {}", path.display()))?;
        }
        self.delete_media(&frame_media_key(id))
    }

    pub fn put_media(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.media_path(key)?;
        fs::write(&path, bytes)
            .with_context(|| format!("Writing media payload {}", path.display()))
    }

    pub fn read_media(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.media_path(key)?;
        fs::read(&path).with_context(|| format!("Reading media payload {}", path.display()))
    }

    pub fn media_exists(&self, key: &str) -> bool {
        self.media_path(key).map(|path| path.exists()).unwrap_or(false)
    }

    pub fn delete_media(&self, key: &str) -> Result<()> {
        let path = self.media_path(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Deleting media payload {}", path.display()))?;
        }
        Ok(())
    }

    pub fn put_settings(&self, key: &str, record: &AmbientRecord) -> Result<()> {
        let path = self.settings_path(key);
        let json = serde_json::to_string_pretty(record)
            .with_context(|| format!("Encoding settings record '{key}'"))?;
        fs::write(&path, json.as_bytes())
            .with_context(|| format!("Writing settings record {}", path.display()))
    }

    /// Reads a settings record. A missing file is `Ok(None)`; a corrupt one
    /// is skipped with a warning, since defaults are always available.
    pub fn load_settings(&self, key: &str) -> Result<Option<AmbientRecord>> {
        let path = self.settings_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .with_context(|| format!("Reading settings record {}", path.display()))?;
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!("[store] skipping unreadable settings record {}: {err:#}", path.display());
                Ok(None)
            }
        }
    }
}

fn read_record(path: &Path) -> Result<FrameRecord> {
    let bytes =
        fs::read(path).with_context(|| format!("Reading frame record {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Parsing frame record {}", path.display()))
}
