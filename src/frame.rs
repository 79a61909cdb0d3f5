use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Locator used for frames that have no real content yet, and as the
/// fallback when a stored locator can no longer be resolved.
pub const PLACEHOLDER_IMAGE: &str = "assets/placeholder.png";

/// Label shown for placeholder content.
pub const DEFAULT_DISPLAY_NAME: &str = "Default image";

pub const SEED_FRAME_COUNT: usize = 5;

/// Identity of a frame. Seed frames keep the small integer ids they are
/// born with so stored records stay matchable across sessions; frames
/// created later carry random tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum FrameId {
    Seed(u32),
    Token(Uuid),
}

impl FrameId {
    pub fn fresh() -> Self {
        FrameId::Token(Uuid::new_v4())
    }

    pub fn is_seed(self) -> bool {
        matches!(self, FrameId::Seed(_))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Seed(n) => write!(f, "{n}"),
            FrameId::Token(token) => write!(f, "{token}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Image,
    Video,
    ExternalVideo,
}

impl ContentKind {
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::ExternalVideo => "external video",
        }
    }
}

/// What a frame shows. `locator` is a durable reference once persisted (an
/// asset path, a store media key, or an external-video reference); within a
/// session it may instead be a transient `mem://` handle backed by
/// `payload`.
#[derive(Debug, Clone)]
pub struct FrameContent {
    pub kind: ContentKind,
    pub locator: String,
    pub payload: Option<Arc<[u8]>>,
}

impl FrameContent {
    pub fn placeholder() -> Self {
        Self {
            kind: ContentKind::Image,
            locator: PLACEHOLDER_IMAGE.to_string(),
            payload: None,
        }
    }

    pub fn external_video(reference: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::ExternalVideo,
            locator: reference.into(),
            payload: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.locator == PLACEHOLDER_IMAGE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    pub fn content_kind(self) -> ContentKind {
        match self {
            UploadKind::Image => ContentKind::Image,
            UploadKind::Video => ContentKind::Video,
        }
    }
}

/// Content handed over by an editing collaborator: either raw bytes picked
/// from disk or a reference to an externally hosted video.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Upload {
        file_name: String,
        kind: UploadKind,
        bytes: Arc<[u8]>,
    },
    External {
        reference: String,
    },
}

impl ContentSource {
    pub fn display_name(&self) -> String {
        match self {
            ContentSource::Upload { file_name, .. } => file_name.clone(),
            ContentSource::External { reference } => format!("External video: {reference}"),
        }
    }
}

/// One positioned panel of the presentation. `rotation` is Euler XYZ in
/// radians.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: FrameId,
    pub position: Vec3,
    pub rotation: Vec3,
    pub title: String,
    pub content: FrameContent,
    pub display_name: String,
}

impl Frame {
    pub fn new(id: FrameId, position: Vec3, rotation: Vec3) -> Self {
        Self {
            id,
            position,
            rotation,
            title: String::from("New Slide"),
            content: FrameContent::placeholder(),
            display_name: String::from(DEFAULT_DISPLAY_NAME),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

struct SeedSlot {
    position: Vec3,
    tilt_degrees: Vec3,
    title: &'static str,
}

/// Canonical deck layout. Positions recede along -Z in 15 unit steps; the
/// first slide faces the home pose straight on.
const SEED_LAYOUT: [SeedSlot; SEED_FRAME_COUNT] = [
    SeedSlot {
        position: Vec3::new(0.0, 0.0, 0.0),
        tilt_degrees: Vec3::new(0.0, 0.0, 0.0),
        title: "Slide 1",
    },
    SeedSlot {
        position: Vec3::new(6.0, -2.0, -15.0),
        tilt_degrees: Vec3::new(12.0, -18.0, 0.0),
        title: "Slide 2",
    },
    SeedSlot {
        position: Vec3::new(-5.0, 3.0, -30.0),
        tilt_degrees: Vec3::new(-15.0, 22.0, 0.0),
        title: "Slide 3",
    },
    SeedSlot {
        position: Vec3::new(4.0, 4.0, -45.0),
        tilt_degrees: Vec3::new(20.0, 14.0, 0.0),
        title: "Slide 4",
    },
    SeedSlot {
        position: Vec3::new(-3.0, -4.0, -60.0),
        tilt_degrees: Vec3::new(-11.0, -25.0, 0.0),
        title: "Slide 5",
    },
];

fn tilt_radians(slot: &SeedSlot) -> Vec3 {
    Vec3::new(
        slot.tilt_degrees.x.to_radians(),
        slot.tilt_degrees.y.to_radians(),
        slot.tilt_degrees.z.to_radians(),
    )
}

/// The deck every fresh session starts from.
pub fn seed_deck() -> Vec<Frame> {
    SEED_LAYOUT
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let mut frame = Frame::new(
                FrameId::Seed(index as u32 + 1),
                slot.position,
                tilt_radians(slot),
            );
            frame.title = slot.title.to_string();
            frame
        })
        .collect()
}

/// Canonical transform for a seed id, if it has one. Stored transforms for
/// seed frames are ignored in favour of these.
pub fn seed_transform(id: FrameId) -> Option<(Vec3, Vec3)> {
    match id {
        FrameId::Seed(n) if (1..=SEED_FRAME_COUNT as u32).contains(&n) => {
            let slot = &SEED_LAYOUT[n as usize - 1];
            Some((slot.position, tilt_radians(slot)))
        }
        _ => None,
    }
}
