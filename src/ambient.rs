use crate::frame::FrameContent;
use crate::media;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use uuid::Uuid;

pub const DEFAULT_LOGO_DISTANCE: f32 = 50.0;

const DRIFT_AMPLITUDE: f32 = 0.5;
const ANGULAR_SPEED_MIN: f32 = 0.1;
const ANGULAR_SPEED_MAX: f32 = 0.3;

/// Decorative billboard floating around the presentation space. Orbital
/// parameters are sampled once at creation and stay fixed for the logo's
/// lifetime, surviving persistence round trips.
#[derive(Debug, Clone)]
pub struct Logo {
    pub id: Uuid,
    pub content: FrameContent,
    pub aspect_ratio: Option<f32>,
    pub phase: f32,
    pub angular_speed: f32,
}

impl Logo {
    pub fn new(content: FrameContent) -> Self {
        let mut rng = rand::thread_rng();
        let aspect_ratio = content.payload.as_deref().and_then(media::aspect_ratio);
        Self {
            id: Uuid::new_v4(),
            content,
            aspect_ratio,
            phase: rng.gen_range(0.0..TAU),
            angular_speed: rng.gen_range(ANGULAR_SPEED_MIN..=ANGULAR_SPEED_MAX),
        }
    }

    /// For content whose dimensions only become known after resolution,
    /// e.g. an externally hosted image measured by the renderer.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect_ratio = Some(aspect);
        }
    }

    /// Slow float around the anchor at elapsed time `t` seconds.
    pub fn drift(&self, t: f32) -> Vec3 {
        Vec3::new(
            (t * self.angular_speed * 0.5 + self.phase).cos() * DRIFT_AMPLITUDE,
            (t * self.angular_speed + self.phase).sin() * DRIFT_AMPLITUDE,
            0.0,
        )
    }
}

/// Presentation-wide decor: the logo set and how far out it orbits.
#[derive(Debug, Clone)]
pub struct AmbientSettings {
    pub logo_distance: f32,
    pub logos: Vec<Logo>,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            logo_distance: DEFAULT_LOGO_DISTANCE,
            logos: Vec::new(),
        }
    }
}

impl AmbientSettings {
    /// World anchor for the logo in `slot`. The ring angle comes from the
    /// slot, the vertical and depth scatter from the logo's own phase, so
    /// placement is stable across sessions without persisting coordinates.
    pub fn anchor(&self, slot: usize) -> Option<Vec3> {
        let logo = self.logos.get(slot)?;
        let count = self.logos.len().max(1) as f32;
        let angle = slot as f32 / count * TAU;
        let distance = self.logo_distance;
        Some(Vec3::new(
            angle.cos() * distance,
            logo.phase.sin() * distance * 0.25,
            logo.phase.cos() * distance * 0.5 - distance * 0.5,
        ))
    }

    pub fn logo(&self, id: Uuid) -> Option<&Logo> {
        self.logos.iter().find(|logo| logo.id == id)
    }

    pub fn logo_mut(&mut self, id: Uuid) -> Option<&mut Logo> {
        self.logos.iter_mut().find(|logo| logo.id == id)
    }

    pub fn remove_logo(&mut self, id: Uuid) -> Option<Logo> {
        let index = self.logos.iter().position(|logo| logo.id == id)?;
        Some(self.logos.remove(index))
    }
}
