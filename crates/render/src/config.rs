use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Window and surface settings for a render context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// MSAA sample count.
    pub samples: u32,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            title: "camrig".into(),
            width: 1024,
            height: 768,
            samples: 4,
            resizable: true,
            vsync: true,
        }
    }
}

/// Perspective projection parameters. Angles are in degrees on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl ProjectionConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// OpenGL-style right-handed perspective for the given aspect ratio.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_radians(), aspect, self.near, self.far)
    }
}
