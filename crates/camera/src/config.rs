use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Camera, Frame, FrameError};

/// Serializable initial camera placement, as found in rig files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl CameraConfig {
    /// Reject placements with no usable frame before building a camera from them.
    pub fn validate(&self) -> Result<(), FrameError> {
        Frame::compute(self.position, self.target, self.up).map(|_| ())
    }

    pub fn build(&self) -> Camera {
        Camera::with_up(self.position, self.target, self.up)
    }
}

impl From<&Camera> for CameraConfig {
    fn from(camera: &Camera) -> Self {
        Self {
            position: camera.position(),
            target: camera.target(),
            up: camera.up_vector(),
        }
    }
}
