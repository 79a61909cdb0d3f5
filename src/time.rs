use std::time::{Duration, Instant};

/// Ceiling for one tick's delta. A process that was suspended resumes with
/// a short glide instead of one giant step.
const MAX_DELTA: Duration = Duration::from_millis(250);

pub struct Clock {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::ZERO }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.last).min(MAX_DELTA);
        self.last = now;
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
