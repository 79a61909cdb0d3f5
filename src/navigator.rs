use crate::ease;
use crate::frame::Frame;
use crate::frame_registry::FrameRegistry;
use glam::{Quat, Vec3};

/// The camera settles this far in front of the active panel, measured along
/// the panel's local +Z.
pub const VIEW_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 4.0);

/// Pose the camera starts from before any frame has been visited.
pub const HOME_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10.0);

const DEFAULT_SMOOTHING: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    Next,
    Previous,
    Home,
}

impl NavCommand {
    pub fn label(self) -> &'static str {
        match self {
            NavCommand::Next => "next",
            NavCommand::Previous => "previous",
            NavCommand::Home => "home",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "next" => Some(NavCommand::Next),
            "previous" => Some(NavCommand::Previous),
            "home" => Some(NavCommand::Home),
            _ => None,
        }
    }
}

/// Applies a navigation command to the deck's active index and returns the
/// index now presented. Next and Previous wrap around the ends.
pub fn apply_command(command: NavCommand, registry: &mut FrameRegistry) -> usize {
    match command {
        NavCommand::Next => registry.step_next(),
        NavCommand::Previous => registry.step_previous(),
        NavCommand::Home => registry.rewind(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl CameraPose {
    pub fn home() -> Self {
        Self {
            position: HOME_POSITION,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::home()
    }
}

/// Glides the camera toward whatever frame is active. The pose is advanced
/// with exponential damping each tick, so motion eases out on arrival and
/// re-targets smoothly mid-flight.
pub struct CameraNavigator {
    pose: CameraPose,
    smoothing: f32,
}

impl CameraNavigator {
    pub fn new(smoothing: f32) -> Self {
        let smoothing = if smoothing > 0.0 {
            smoothing
        } else {
            DEFAULT_SMOOTHING
        };
        Self {
            pose: CameraPose::home(),
            smoothing,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Where the camera comes to rest for `frame`: offset out along the
    /// panel's facing direction, oriented like the panel itself.
    pub fn target_pose(frame: &Frame) -> CameraPose {
        let orientation = frame.orientation();
        CameraPose {
            position: frame.position + orientation * VIEW_OFFSET,
            orientation,
        }
    }

    /// Advances the pose toward the active frame. With no active frame (the
    /// deck is mid-mutation) the pose is left untouched; a zero `dt` is a
    /// no-op by construction.
    pub fn tick(&mut self, active: Option<&Frame>, dt: f32) {
        let Some(frame) = active else {
            return;
        };
        let target = Self::target_pose(frame);
        self.pose.position =
            ease::damp_vec3(self.pose.position, target.position, self.smoothing, dt);
        self.pose.orientation =
            ease::damp_quat(self.pose.orientation, target.orientation, self.smoothing, dt);
    }
}

impl Default for CameraNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}
