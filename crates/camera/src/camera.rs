use std::cell::Cell;

use glam::{Mat3, Mat4, Vec3};

use crate::frame::{self, Frame, FrameError};

/// One lazily computed entry of the frame cache.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cached<T> {
    Invalid,
    Valid(T),
}

impl<T> Cached<T> {
    fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Position of a cache entry in the dependency chain
/// direction → right → up → view.
///
/// Invalidating a stage invalidates every later stage with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Direction,
    Right,
    Up,
    View,
}

/// Snapshot of which derived values are currently cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStatus {
    pub direction: bool,
    pub right: bool,
    pub up: bool,
    pub view: bool,
}

/// Look-at camera described by position, target and a world-up seed.
///
/// The orthonormal frame (`direction`, `right`, `up`) and the view matrix are
/// derived on demand and cached; every mutator drops exactly the cached
/// entries that depend on what it changed. Reads take `&self`, so the caches
/// live in `Cell`s and a `Camera` is not `Sync`: share it across threads only
/// behind external synchronization.
///
/// Degenerate configurations (`position == target`, or `world_up` parallel to
/// the view direction) have no frame. The `try_*` accessors report them as a
/// [`FrameError`]; the plain accessors return NaN-filled values and log a
/// warning. Motion operators assume a non-degenerate camera.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    world_up: Vec3,
    direction: Cell<Cached<Vec3>>,
    right: Cell<Cached<Vec3>>,
    up: Cell<Cached<Vec3>>,
    view: Cell<Cached<Mat4>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_up(Vec3::Z, Vec3::ZERO, Vec3::Y)
    }
}

impl Camera {
    /// Camera at `position` looking at `target` with +Y as world up.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self::with_up(position, target, Vec3::Y)
    }

    pub fn with_up(position: Vec3, target: Vec3, world_up: Vec3) -> Self {
        Self {
            position,
            target,
            world_up,
            direction: Cell::new(Cached::Invalid),
            right: Cell::new(Cached::Invalid),
            up: Cell::new(Cached::Invalid),
            view: Cell::new(Cached::Invalid),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// The world-up seed vector, not the camera's local up axis (see [`Camera::up`]).
    pub fn up_vector(&self) -> Vec3 {
        self.world_up
    }

    /// Distance between eye and target.
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate_from(Stage::Direction);
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.invalidate_from(Stage::Direction);
    }

    /// Replace the world-up seed. The view direction does not depend on it and stays cached.
    pub fn set_up_vector(&mut self, up: Vec3) {
        self.world_up = up;
        self.invalidate_from(Stage::Right);
    }

    /// Which derived values are cached right now.
    pub fn frame_status(&self) -> FrameStatus {
        FrameStatus {
            direction: self.direction.get().is_valid(),
            right: self.right.get().is_valid(),
            up: self.up.get().is_valid(),
            view: self.view.get().is_valid(),
        }
    }

    // ---- derived frame -------------------------------------------------

    /// Unit vector from target toward position (camera local +Z).
    pub fn try_direction(&self) -> Result<Vec3, FrameError> {
        self.ensure_direction()
    }

    /// Camera local +X.
    pub fn try_right(&self) -> Result<Vec3, FrameError> {
        self.ensure_right()
    }

    /// Camera local +Y.
    pub fn try_up(&self) -> Result<Vec3, FrameError> {
        self.ensure_up()
    }

    /// World-to-camera transform.
    pub fn try_view_matrix(&self) -> Result<Mat4, FrameError> {
        self.ensure_view()
    }

    /// The whole cached frame at once.
    pub fn try_frame(&self) -> Result<Frame, FrameError> {
        Ok(Frame {
            direction: self.ensure_direction()?,
            right: self.ensure_right()?,
            up: self.ensure_up()?,
            view: self.ensure_view()?,
        })
    }

    pub fn direction(&self) -> Vec3 {
        or_nan(self.ensure_direction(), Vec3::NAN)
    }

    pub fn right(&self) -> Vec3 {
        or_nan(self.ensure_right(), Vec3::NAN)
    }

    pub fn up(&self) -> Vec3 {
        or_nan(self.ensure_up(), Vec3::NAN)
    }

    pub fn view_matrix(&self) -> Mat4 {
        or_nan(self.ensure_view(), Mat4::NAN)
    }

    // ---- global motion -------------------------------------------------

    /// Translate eye and target together. Orientation is unchanged.
    pub fn move_global(&mut self, delta: Vec3) {
        self.position += delta;
        self.target += delta;
        self.invalidate_from(Stage::View);
    }

    /// Translate the eye only; the camera keeps looking at the same target.
    pub fn move_position(&mut self, delta: Vec3) {
        self.position += delta;
        self.invalidate_from(Stage::Direction);
    }

    /// Orbit the eye around the target about the camera's right axis.
    pub fn revolve_vertical(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.right(), -angle);
        self.revolve(rotation);
    }

    /// Orbit the eye around the target about the camera's up axis.
    pub fn revolve_horizontal(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.up(), angle);
        self.revolve(rotation);
    }

    // ---- real camera moves ---------------------------------------------

    /// Slide sideways along the local right axis.
    pub fn truck(&mut self, x: f32) {
        let offset = self.right() * x;
        self.move_global(offset);
    }

    /// Slide vertically along the local up axis.
    pub fn pedestal(&mut self, y: f32) {
        let offset = self.up() * y;
        self.move_global(offset);
    }

    /// Slide forward (positive `z`) or back along the viewing axis.
    pub fn dolly(&mut self, z: f32) {
        let offset = -self.direction() * z;
        self.move_global(offset);
    }

    /// Rotate the view vertically about the local right axis, eye fixed.
    pub fn tilt(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.right(), angle);
        self.turn(rotation);
    }

    /// Rotate the view horizontally about the local up axis, eye fixed.
    pub fn pan(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.up(), -angle);
        self.turn(rotation);
    }

    /// Rotate the world-up seed about the viewing axis. Eye and target stay put.
    pub fn roll(&mut self, angle: f32) {
        let rotation = Mat3::from_axis_angle(self.direction(), angle);
        self.world_up = rotation * self.up();
        self.invalidate_from(Stage::Right);
    }

    // ---- internals -----------------------------------------------------

    fn revolve(&mut self, rotation: Mat3) {
        let radius = self.distance();
        let direction = rotation * self.direction();
        self.position = self.target + direction * radius;
        self.invalidate_from(Stage::Direction);
    }

    fn turn(&mut self, rotation: Mat3) {
        let reach = self.distance();
        let forward = rotation * -self.direction();
        self.target = self.position + forward * reach;
        self.invalidate_from(Stage::Direction);
    }

    fn invalidate_from(&self, stage: Stage) {
        if stage <= Stage::Direction {
            self.direction.set(Cached::Invalid);
        }
        if stage <= Stage::Right {
            self.right.set(Cached::Invalid);
        }
        if stage <= Stage::Up {
            self.up.set(Cached::Invalid);
        }
        self.view.set(Cached::Invalid);
    }

    fn ensure_direction(&self) -> Result<Vec3, FrameError> {
        if let Cached::Valid(direction) = self.direction.get() {
            return Ok(direction);
        }
        let direction = frame::direction_axis(self.position, self.target)?;
        tracing::trace!(%direction, "recomputed camera direction");
        self.direction.set(Cached::Valid(direction));
        Ok(direction)
    }

    fn ensure_right(&self) -> Result<Vec3, FrameError> {
        if let Cached::Valid(right) = self.right.get() {
            return Ok(right);
        }
        let direction = self.ensure_direction()?;
        let right = frame::right_axis(self.world_up, direction)?;
        tracing::trace!(%right, "recomputed camera right axis");
        self.right.set(Cached::Valid(right));
        Ok(right)
    }

    fn ensure_up(&self) -> Result<Vec3, FrameError> {
        if let Cached::Valid(up) = self.up.get() {
            return Ok(up);
        }
        let direction = self.ensure_direction()?;
        let right = self.ensure_right()?;
        let up = frame::up_axis(direction, right)?;
        tracing::trace!(%up, "recomputed camera up axis");
        self.up.set(Cached::Valid(up));
        Ok(up)
    }

    fn ensure_view(&self) -> Result<Mat4, FrameError> {
        if let Cached::Valid(view) = self.view.get() {
            return Ok(view);
        }
        let direction = self.ensure_direction()?;
        let right = self.ensure_right()?;
        let up = self.ensure_up()?;
        let view = frame::view_from_axes(right, up, direction, self.position);
        tracing::trace!("recomputed camera view matrix");
        self.view.set(Cached::Valid(view));
        Ok(view)
    }
}

fn or_nan<T>(value: Result<T, FrameError>, nan: T) -> T {
    value.unwrap_or_else(|err| {
        tracing::warn!(%err, "degenerate camera frame");
        nan
    })
}
