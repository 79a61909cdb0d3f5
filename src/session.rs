use crate::ambient::{AmbientSettings, Logo};
use crate::config::SessionConfig;
use crate::events::{DeckEvent, EventBus};
use crate::frame::{ContentSource, Frame, FrameContent, FrameId, DEFAULT_DISPLAY_NAME};
use crate::frame_registry::FrameRegistry;
use crate::media::{self, MediaCache};
use crate::navigator::{self, CameraNavigator, CameraPose, NavCommand};
use crate::store::{
    self, AmbientRecord, ContentData, DeckStore, FrameRecord, LogoRecord, SETTINGS_KEY,
};
use crate::store_sync::StoreSync;
use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// One live presentation: the deck, the gliding camera, the payload cache,
/// ambient decor and the persistence worker. All mutation goes through
/// here so the store mirror can never drift from what collaborators see.
pub struct Session {
    registry: FrameRegistry,
    navigator: CameraNavigator,
    media: MediaCache,
    ambient: AmbientSettings,
    events: EventBus,
    sync: StoreSync,
}

impl Session {
    /// Opens the store and rebuilds the last session's deck from it. Every
    /// storage failure is downgraded to a warning and a fallback; only a
    /// store root that cannot be created at all is fatal.
    pub fn restore(config: &SessionConfig) -> Result<Self> {
        let store = DeckStore::open(&config.store.data_dir)?;
        let mut cache = MediaCache::new();

        let records = match store.load_frames() {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "[session] loading frame records failed: {err:#}; starting from the canonical deck"
                );
                Vec::new()
            }
        };
        let seeded = records.is_empty();
        let frames: Vec<Frame> = records
            .into_iter()
            .map(|record| resolve_record(record, &store, &mut cache))
            .collect();
        let registry = FrameRegistry::from_frames(frames);

        let ambient = match store.load_settings(SETTINGS_KEY) {
            Ok(Some(record)) => ambient_from_record(record, &store, &mut cache),
            Ok(None) => AmbientSettings {
                logo_distance: config.ambient.logo_distance,
                logos: Vec::new(),
            },
            Err(err) => {
                warn!("[session] loading ambient settings failed: {err:#}; using defaults");
                AmbientSettings {
                    logo_distance: config.ambient.logo_distance,
                    logos: Vec::new(),
                }
            }
        };

        let session = Self {
            registry,
            navigator: CameraNavigator::new(config.camera.smoothing),
            media: cache,
            ambient,
            events: EventBus::default(),
            sync: StoreSync::spawn(store),
        };
        if seeded {
            info!(
                "[session] store at {} is empty; seeding the canonical deck",
                config.store.data_dir.display()
            );
            session.persist_all_frames();
        }
        Ok(session)
    }

    /// Clears every stored frame and starts over from the canonical deck.
    /// Ambient settings are left alone.
    pub fn reset(config: &SessionConfig) -> Result<Self> {
        let store = DeckStore::open(&config.store.data_dir)?;
        match store.load_frames() {
            Ok(records) => {
                for record in records {
                    if let Err(err) = store.delete_frame(record.id) {
                        warn!("[session] clearing frame record {} failed: {err:#}", record.id);
                    }
                }
            }
            Err(err) => warn!("[session] clearing store failed: {err:#}"),
        }
        let session = Self {
            registry: FrameRegistry::new(),
            navigator: CameraNavigator::new(config.camera.smoothing),
            media: MediaCache::new(),
            ambient: AmbientSettings {
                logo_distance: config.ambient.logo_distance,
                logos: Vec::new(),
            },
            events: EventBus::default(),
            sync: StoreSync::spawn(store),
        };
        info!("[session] reset deck at {}", config.store.data_dir.display());
        session.persist_all_frames();
        Ok(session)
    }

    pub fn frames(&self) -> &[Frame] {
        self.registry.frames()
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.registry.get(id)
    }

    pub fn active_index(&self) -> usize {
        self.registry.active_index()
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.registry.active_frame()
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.navigator.pose()
    }

    pub fn ambient(&self) -> &AmbientSettings {
        &self.ambient
    }

    pub fn media(&self) -> &MediaCache {
        &self.media
    }

    pub fn drain_events(&mut self) -> Vec<DeckEvent> {
        self.events.drain()
    }

    pub fn add_frame(&mut self) -> FrameId {
        let id = self.registry.add();
        let index = self.registry.len() - 1;
        self.events.push(DeckEvent::FrameAdded { id, index });
        self.persist_frame(id, None);
        id
    }

    /// Inserts a frame after `index`. The inserted frame and every shifted
    /// follower get their records rewritten, keeping the mirror exact.
    pub fn insert_after(&mut self, index: usize) -> Option<FrameId> {
        let id = self.registry.insert_after(index)?;
        self.events.push(DeckEvent::FrameAdded { id, index: index + 1 });
        let shifted: Vec<FrameId> = self.registry.frames()[index + 1..]
            .iter()
            .map(|frame| frame.id)
            .collect();
        for id in shifted {
            self.persist_frame(id, None);
        }
        Some(id)
    }

    pub fn remove_frame(&mut self, id: FrameId) -> bool {
        let active_before = self.registry.active_index();
        let Some(removed) = self.registry.remove(id) else {
            return false;
        };
        self.media.release(&removed.content.locator);
        self.events.push(DeckEvent::FrameRemoved { id });
        let active_now = self.registry.active_index();
        if active_now != active_before {
            self.events.push(DeckEvent::ActiveChanged { index: active_now });
        }
        self.sync.queue_delete_frame(id);
        true
    }

    pub fn update_content(&mut self, id: FrameId, source: ContentSource) -> bool {
        let (content, payload, display_name) = self.content_from_source(source);
        let locator = content.locator.clone();
        let Some(previous) = self.registry.update_content(id, content, display_name) else {
            self.media.release(&locator);
            return false;
        };
        if previous.payload.is_some() && payload.is_none() {
            self.sync.queue_delete_media(store::frame_media_key(id));
        }
        self.media.release(&previous.locator);
        self.events.push(DeckEvent::FrameContentChanged { id });
        self.persist_frame(id, payload);
        true
    }

    /// Renames a frame. The whole record is rewritten, so the rename never
    /// clobbers the stored content reference.
    pub fn update_title(&mut self, id: FrameId, title: impl Into<String>) -> bool {
        if !self.registry.update_title(id, title) {
            return false;
        }
        self.events.push(DeckEvent::FrameTitleChanged { id });
        self.persist_frame(id, None);
        true
    }

    pub fn reorder(&mut self, new_order: &[FrameId]) -> bool {
        if !self.registry.reorder(new_order) {
            return false;
        }
        self.events.push(DeckEvent::DeckReordered);
        let ids: Vec<FrameId> = self.registry.frames().iter().map(|frame| frame.id).collect();
        for id in ids {
            self.persist_frame(id, None);
        }
        true
    }

    pub fn handle_command(&mut self, command: NavCommand) -> usize {
        let index = navigator::apply_command(command, &mut self.registry);
        self.events.push(DeckEvent::ActiveChanged { index });
        index
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if !self.registry.set_active(index) {
            return false;
        }
        self.events.push(DeckEvent::ActiveChanged { index });
        true
    }

    /// Advances the camera glide by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.navigator.tick(self.registry.active_frame(), dt);
    }

    pub fn set_logo_distance(&mut self, distance: f32) {
        self.ambient.logo_distance = distance.max(0.0);
        self.events.push(DeckEvent::AmbientChanged);
        self.persist_ambient(Vec::new());
    }

    pub fn add_logo(&mut self, source: ContentSource) -> Uuid {
        let (content, payload, _) = self.content_from_source(source);
        let logo = Logo::new(content);
        let id = logo.id;
        self.ambient.logos.push(logo);
        self.events.push(DeckEvent::LogoAdded { id });
        let payloads = payload
            .map(|bytes| vec![(store::logo_media_key(id), bytes)])
            .unwrap_or_default();
        self.persist_ambient(payloads);
        id
    }

    pub fn update_logo_content(&mut self, id: Uuid, source: ContentSource) -> bool {
        let (content, payload, _) = self.content_from_source(source);
        let aspect = content.payload.as_deref().and_then(media::aspect_ratio);
        let previous = match self.ambient.logo_mut(id) {
            Some(logo) => {
                logo.aspect_ratio = aspect;
                std::mem::replace(&mut logo.content, content)
            }
            None => {
                self.media.release(&content.locator);
                return false;
            }
        };
        if previous.payload.is_some() && payload.is_none() {
            self.sync.queue_delete_media(store::logo_media_key(id));
        }
        self.media.release(&previous.locator);
        self.events.push(DeckEvent::AmbientChanged);
        let payloads = payload
            .map(|bytes| vec![(store::logo_media_key(id), bytes)])
            .unwrap_or_default();
        self.persist_ambient(payloads);
        true
    }

    pub fn remove_logo(&mut self, id: Uuid) -> bool {
        let Some(removed) = self.ambient.remove_logo(id) else {
            return false;
        };
        if removed.content.payload.is_some() {
            self.sync.queue_delete_media(store::logo_media_key(id));
        }
        self.media.release(&removed.content.locator);
        self.events.push(DeckEvent::LogoRemoved { id });
        self.persist_ambient(Vec::new());
        true
    }

    /// Backfills a measured aspect ratio, e.g. for externally hosted
    /// content the renderer has just resolved.
    pub fn set_logo_aspect_ratio(&mut self, id: Uuid, aspect: f32) -> bool {
        match self.ambient.logo_mut(id) {
            Some(logo) => {
                logo.set_aspect_ratio(aspect);
                self.events.push(DeckEvent::AmbientChanged);
                self.persist_ambient(Vec::new());
                true
            }
            None => false,
        }
    }

    /// Blocks until every queued store write has been applied. Tests and
    /// orderly shutdowns use this; normal operation never waits.
    pub fn flush(&self) {
        self.sync.flush();
    }

    fn persist_frame(&self, id: FrameId, payload: Option<Arc<[u8]>>) {
        if let Some(frame) = self.registry.get(id) {
            self.sync.queue_put_frame(FrameRecord::from_frame(frame), payload);
        }
    }

    fn persist_all_frames(&self) {
        for frame in self.registry.frames() {
            self.sync.queue_put_frame(FrameRecord::from_frame(frame), None);
        }
    }

    fn persist_ambient(&self, payloads: Vec<(String, Arc<[u8]>)>) {
        self.sync
            .queue_put_settings(AmbientRecord::from_settings(&self.ambient), payloads);
    }

    fn content_from_source(
        &mut self,
        source: ContentSource,
    ) -> (FrameContent, Option<Arc<[u8]>>, String) {
        let display_name = source.display_name();
        match source {
            ContentSource::Upload { kind, bytes, .. } => {
                let handle = self.media.mint(bytes.clone());
                let content = FrameContent {
                    kind: kind.content_kind(),
                    locator: handle,
                    payload: Some(bytes.clone()),
                };
                (content, Some(bytes), display_name)
            }
            ContentSource::External { reference } => {
                (FrameContent::external_video(reference), None, display_name)
            }
        }
    }
}

/// Turns a stored content reference back into displayable content. Returns
/// the content and whether it had to fall back to the placeholder.
fn resolve_content(
    content: ContentData,
    store: &DeckStore,
    cache: &mut MediaCache,
) -> (FrameContent, bool) {
    let ContentData { kind, locator } = content;
    if MediaCache::is_transient(&locator) {
        warn!("[session] stale display handle '{locator}' in stored record; using placeholder");
        return (FrameContent::placeholder(), true);
    }
    if DeckStore::is_media_key(&locator) {
        return match store.read_media(&locator) {
            Ok(bytes) => {
                let bytes: Arc<[u8]> = Arc::from(bytes.into_boxed_slice());
                let handle = cache.mint(bytes.clone());
                (FrameContent { kind, locator: handle, payload: Some(bytes) }, false)
            }
            Err(err) => {
                warn!("[session] media payload '{locator}' unavailable: {err:#}; using placeholder");
                (FrameContent::placeholder(), true)
            }
        };
    }
    (FrameContent { kind, locator, payload: None }, false)
}

fn resolve_record(record: FrameRecord, store: &DeckStore, cache: &mut MediaCache) -> Frame {
    let FrameRecord { id, position, rotation, title, content, display_name } = record;
    let (content, fell_back) = resolve_content(content, store, cache);
    let display_name = if fell_back {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        display_name
    };
    Frame {
        id,
        position: position.into(),
        rotation: rotation.into(),
        title,
        content,
        display_name,
    }
}

fn ambient_from_record(
    record: AmbientRecord,
    store: &DeckStore,
    cache: &mut MediaCache,
) -> AmbientSettings {
    let logos = record
        .items
        .into_iter()
        .map(|item| {
            let LogoRecord { id, content, aspect_ratio, phase, angular_speed } = item;
            let (content, _) = resolve_content(content, store, cache);
            let aspect_ratio =
                aspect_ratio.or_else(|| content.payload.as_deref().and_then(media::aspect_ratio));
            Logo { id, content, aspect_ratio, phase, angular_speed }
        })
        .collect();
    AmbientSettings { logo_distance: record.distance, logos }
}
