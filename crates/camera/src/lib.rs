//! Camera core: an orthonormal look-at frame derived from position, target
//! and a world-up seed, cached per axis, with global, orbital and
//! cinematographic motion operators.
//!
//! # Invariants
//! - `direction`, `right`, `up` are a right-handed orthonormal basis whenever they are valid.
//! - The view matrix maps the eye to the origin; camera-space +Z points behind the viewer.
//! - A mutation drops exactly the cached values that depend on it, and no accessor serves a stale value.
//! - The cached path and [`look_at`] share one set of per-axis primitives.

mod camera;
mod config;
pub mod frame;
mod motion;

pub use camera::{Camera, FrameStatus};
pub use config::CameraConfig;
pub use frame::{look_at, try_look_at, Frame, FrameError};
pub use motion::{apply_all, CameraMove};

pub fn crate_info() -> &'static str {
    concat!("camrig-camera v", env!("CARGO_PKG_VERSION"))
}
