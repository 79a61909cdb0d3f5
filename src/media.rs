use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use uuid::Uuid;

/// Scheme prefix marking a locator as session-local. A stored record whose
/// locator still carries this prefix was written without its payload and
/// cannot be resolved again.
pub const TRANSIENT_SCHEME: &str = "mem://";

/// Owns the binary payloads a session is displaying and hands out opaque
/// `mem://` handles for them. Handles from one session are meaningless in
/// the next.
#[derive(Default)]
pub struct MediaCache {
    blobs: HashMap<String, Arc<[u8]>>,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload and returns a fresh display handle for it.
    pub fn mint(&mut self, bytes: Arc<[u8]>) -> String {
        let handle = format!("{TRANSIENT_SCHEME}{}", Uuid::new_v4());
        self.blobs.insert(handle.clone(), bytes);
        handle
    }

    pub fn resolve(&self, handle: &str) -> Option<Arc<[u8]>> {
        self.blobs.get(handle).cloned()
    }

    /// Drops the payload behind a handle. Non-transient locators are
    /// ignored, so callers can release unconditionally.
    pub fn release(&mut self, locator: &str) {
        if Self::is_transient(locator) {
            self.blobs.remove(locator);
        }
    }

    pub fn is_transient(locator: &str) -> bool {
        locator.starts_with(TRANSIENT_SCHEME)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// Width over height read from an encoded image header, or `None` when the
/// payload is not a recognizable image (video uploads land here).
pub fn aspect_ratio(bytes: &[u8]) -> Option<f32> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    if height == 0 {
        return None;
    }
    Some(width as f32 / height as f32)
}
