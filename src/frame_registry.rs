use crate::frame::{self, Frame, FrameContent, FrameId};
use glam::Vec3;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const STEP_LATERAL_X: f32 = 10.0;
const STEP_LATERAL_Y: f32 = 5.0;
const STEP_DEPTH: f32 = -15.0;
const TILT_MIN_DEGREES: f32 = 10.0;
const TILT_MAX_DEGREES: f32 = 30.0;

fn sample_step(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-STEP_LATERAL_X..=STEP_LATERAL_X),
        rng.gen_range(-STEP_LATERAL_Y..=STEP_LATERAL_Y),
        STEP_DEPTH,
    )
}

fn sample_tilt(rng: &mut impl Rng) -> Vec3 {
    let mut axis = || {
        let magnitude = rng.gen_range(TILT_MIN_DEGREES..=TILT_MAX_DEGREES);
        let signed = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
        signed.to_radians()
    };
    Vec3::new(axis(), axis(), 0.0)
}

/// Ordered, mutable collection of presentation frames plus the index of the
/// one currently presented. The deck is never empty and ids never repeat.
pub struct FrameRegistry {
    frames: Vec<Frame>,
    active: usize,
}

impl FrameRegistry {
    /// A registry holding the canonical deck.
    pub fn new() -> Self {
        Self {
            frames: frame::seed_deck(),
            active: 0,
        }
    }

    /// Rebuilds a registry from loaded frames. Seed frames are snapped back
    /// to their canonical transforms, then display order is recovered from
    /// depth: every mutation keeps slot order strictly receding along -Z.
    /// An empty load falls back to the canonical deck.
    pub fn from_frames(mut frames: Vec<Frame>) -> Self {
        if frames.is_empty() {
            return Self::new();
        }
        for frame in &mut frames {
            if let Some((position, rotation)) = frame::seed_transform(frame.id) {
                frame.position = position;
                frame.rotation = rotation;
            }
        }
        frames.sort_by(|a, b| {
            b.position
                .z
                .partial_cmp(&a.position.z)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { frames, active: 0 }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.frames.get(self.active)
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    pub fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|frame| frame.id == id)
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.index_of(id).is_some()
    }

    /// Appends a frame behind the current last one: a fresh lateral offset,
    /// a fixed 15 unit depth step, and a random tilt. Returns the new id.
    pub fn add(&mut self) -> FrameId {
        let mut rng = rand::thread_rng();
        let (position, rotation) = match self.frames.last() {
            Some(last) => (last.position + sample_step(&mut rng), sample_tilt(&mut rng)),
            None => (Vec3::ZERO, Vec3::ZERO),
        };
        let frame = Frame::new(FrameId::fresh(), position, rotation);
        let id = frame.id;
        self.frames.push(frame);
        id
    }

    /// Inserts a fresh frame directly after `index` and pushes every later
    /// frame along by the same sampled offset, so the corridor behind the
    /// insertion point keeps its shape. Out of range indices are rejected.
    pub fn insert_after(&mut self, index: usize) -> Option<FrameId> {
        if index >= self.frames.len() {
            return None;
        }
        let mut rng = rand::thread_rng();
        let step = sample_step(&mut rng);
        let position = self.frames[index].position + step;
        let frame = Frame::new(FrameId::fresh(), position, sample_tilt(&mut rng));
        let id = frame.id;
        self.frames.insert(index + 1, frame);
        for follower in &mut self.frames[index + 2..] {
            follower.position += step;
        }
        Some(id)
    }

    /// Removes a frame, returning it so the caller can release its payload.
    /// The last remaining frame cannot be removed. The active index is
    /// clamped back into range when the tail shrinks under it.
    pub fn remove(&mut self, id: FrameId) -> Option<Frame> {
        if self.frames.len() <= 1 {
            return None;
        }
        let index = self.index_of(id)?;
        let removed = self.frames.remove(index);
        if self.active >= self.frames.len() {
            self.active = self.frames.len() - 1;
        }
        Some(removed)
    }

    /// Swaps in new content for a frame, returning the previous content so
    /// its payload handle can be released.
    pub fn update_content(
        &mut self,
        id: FrameId,
        content: FrameContent,
        display_name: String,
    ) -> Option<FrameContent> {
        let frame = self.frames.iter_mut().find(|frame| frame.id == id)?;
        frame.display_name = display_name;
        Some(std::mem::replace(&mut frame.content, content))
    }

    pub fn update_title(&mut self, id: FrameId, title: impl Into<String>) -> bool {
        match self.frames.iter_mut().find(|frame| frame.id == id) {
            Some(frame) => {
                frame.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Rearranges the deck to `new_order` while keeping the spatial slots
    /// fixed: slot k keeps its transform, identity and content travel with
    /// the id. Anything short of a permutation of the current ids is
    /// rejected wholesale.
    pub fn reorder(&mut self, new_order: &[FrameId]) -> bool {
        if new_order.len() != self.frames.len() {
            return false;
        }
        let mut seen = HashSet::with_capacity(new_order.len());
        if !new_order
            .iter()
            .all(|id| seen.insert(*id) && self.contains(*id))
        {
            return false;
        }
        let transforms: Vec<(Vec3, Vec3)> = self
            .frames
            .iter()
            .map(|frame| (frame.position, frame.rotation))
            .collect();
        let mut pool: HashMap<FrameId, Frame> =
            self.frames.drain(..).map(|frame| (frame.id, frame)).collect();
        let mut reordered: Vec<Frame> = new_order
            .iter()
            .filter_map(|id| pool.remove(id))
            .collect();
        for (frame, (position, rotation)) in reordered.iter_mut().zip(transforms) {
            frame.position = position;
            frame.rotation = rotation;
        }
        self.frames = reordered;
        true
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn step_next(&mut self) -> usize {
        if !self.frames.is_empty() {
            self.active = (self.active + 1) % self.frames.len();
        }
        self.active
    }

    pub fn step_previous(&mut self) -> usize {
        if !self.frames.is_empty() {
            self.active = (self.active + self.frames.len() - 1) % self.frames.len();
        }
        self.active
    }

    pub fn rewind(&mut self) -> usize {
        self.active = 0;
        self.active
    }
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::seed_deck;

    #[test]
    fn step_samples_stay_in_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let step = sample_step(&mut rng);
            assert!(step.x >= -STEP_LATERAL_X && step.x <= STEP_LATERAL_X);
            assert!(step.y >= -STEP_LATERAL_Y && step.y <= STEP_LATERAL_Y);
            assert_eq!(step.z, STEP_DEPTH);
        }
    }

    #[test]
    fn tilt_samples_keep_magnitude_window() {
        let mut rng = rand::thread_rng();
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..200 {
            let tilt = sample_tilt(&mut rng);
            for axis in [tilt.x, tilt.y] {
                let degrees = axis.to_degrees();
                assert!(degrees.abs() >= TILT_MIN_DEGREES - 1e-3);
                assert!(degrees.abs() <= TILT_MAX_DEGREES + 1e-3);
                saw_negative |= degrees < 0.0;
                saw_positive |= degrees > 0.0;
            }
            assert_eq!(tilt.z, 0.0);
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn from_frames_recovers_depth_order() {
        let mut frames = seed_deck();
        frames.reverse();
        let registry = FrameRegistry::from_frames(frames);
        let depths: Vec<f32> = registry.frames().iter().map(|f| f.position.z).collect();
        for pair in depths.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn from_frames_snaps_seed_transforms() {
        let mut frames = seed_deck();
        frames[2].position = Vec3::new(99.0, 99.0, 99.0);
        frames[2].rotation = Vec3::new(1.0, 1.0, 1.0);
        let registry = FrameRegistry::from_frames(frames);
        let canonical = seed_deck();
        assert_eq!(registry.frames()[2].position, canonical[2].position);
        assert_eq!(registry.frames()[2].rotation, canonical[2].rotation);
    }

    #[test]
    fn from_frames_empty_falls_back_to_seed_deck() {
        let registry = FrameRegistry::from_frames(Vec::new());
        assert_eq!(registry.len(), seed_deck().len());
    }
}
