//! Gram-Schmidt look-at frame shared by the cached [`Camera`](crate::Camera)
//! and the stateless [`look_at`] helper.
//!
//! Each axis has its own step function so the camera can recompute a single
//! stale axis without redoing the ones before it.

use glam::{Mat4, Vec3, Vec4};

/// A look-at configuration with no usable orthonormal frame.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// `position - target` has zero length, so there is no view direction.
    #[error("camera position and target coincide at {0}")]
    CoincidentTarget(Vec3),
    /// `world_up × direction` has zero length, so there is no right axis.
    #[error("world up {up} is parallel to view direction {direction}")]
    ParallelUp { up: Vec3, direction: Vec3 },
}

/// Normalize `v`, or `None` when it has zero (or non-finite) length.
///
/// This is the only failure-prone primitive of the frame computation.
pub fn unit(v: Vec3) -> Option<Vec3> {
    v.try_normalize()
}

/// Camera local +Z: unit vector pointing from `target` back toward `position`.
pub fn direction_axis(position: Vec3, target: Vec3) -> Result<Vec3, FrameError> {
    unit(position - target).ok_or(FrameError::CoincidentTarget(position))
}

/// Camera local +X: `normalize(world_up × direction)`.
pub fn right_axis(world_up: Vec3, direction: Vec3) -> Result<Vec3, FrameError> {
    unit(world_up.cross(direction)).ok_or(FrameError::ParallelUp {
        up: world_up,
        direction,
    })
}

/// Camera local +Y: `normalize(direction × right)`.
pub fn up_axis(direction: Vec3, right: Vec3) -> Result<Vec3, FrameError> {
    // Only fails when an upstream axis was already degenerate.
    unit(direction.cross(right)).ok_or(FrameError::ParallelUp {
        up: right,
        direction,
    })
}

/// Compose `R · T`: rows of `R` are `right, up, direction`, `T` translates by `-position`.
///
/// Camera-space +Z points behind the viewer.
pub fn view_from_axes(right: Vec3, up: Vec3, direction: Vec3, position: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(right.x, up.x, direction.x, 0.0),
        Vec4::new(right.y, up.y, direction.y, 0.0),
        Vec4::new(right.z, up.z, direction.z, 0.0),
        Vec4::new(
            -right.dot(position),
            -up.dot(position),
            -direction.dot(position),
            1.0,
        ),
    )
}

/// The full orthonormal frame and view matrix for one look-at configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub direction: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub view: Mat4,
}

impl Frame {
    /// Run the whole Gram-Schmidt chain: direction, right, up, then the view matrix.
    pub fn compute(position: Vec3, target: Vec3, world_up: Vec3) -> Result<Self, FrameError> {
        let direction = direction_axis(position, target)?;
        let right = right_axis(world_up, direction)?;
        let up = up_axis(direction, right)?;
        Ok(Self {
            direction,
            right,
            up,
            view: view_from_axes(right, up, direction, position),
        })
    }
}

/// Stateless view matrix for callers that do not keep a [`Camera`](crate::Camera)
/// around (shadow or reflection passes, one-shot captures).
pub fn try_look_at(position: Vec3, target: Vec3, world_up: Vec3) -> Result<Mat4, FrameError> {
    Frame::compute(position, target, world_up).map(|f| f.view)
}

/// Like [`try_look_at`], but a degenerate configuration yields `Mat4::NAN`.
pub fn look_at(position: Vec3, target: Vec3, world_up: Vec3) -> Mat4 {
    match try_look_at(position, target, world_up) {
        Ok(view) => view,
        Err(err) => {
            tracing::warn!(%err, "degenerate look-at configuration");
            Mat4::NAN
        }
    }
}
