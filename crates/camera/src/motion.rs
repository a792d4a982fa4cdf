use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Camera;

/// A camera mutation expressed as data.
///
/// Controllers and rig files produce these; the camera never sees raw input.
/// Angles are radians, distances are world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraMove {
    SetPosition { position: Vec3 },
    SetTarget { target: Vec3 },
    SetUp { up: Vec3 },
    MoveGlobal { delta: Vec3 },
    MovePosition { delta: Vec3 },
    RevolveVertical { angle: f32 },
    RevolveHorizontal { angle: f32 },
    Truck { distance: f32 },
    Pedestal { distance: f32 },
    Dolly { distance: f32 },
    Tilt { angle: f32 },
    Pan { angle: f32 },
    Roll { angle: f32 },
}

impl CameraMove {
    /// Apply this move to `camera`.
    pub fn apply(&self, camera: &mut Camera) {
        tracing::debug!(camera_move = ?self, "applying camera move");
        match *self {
            Self::SetPosition { position } => camera.set_position(position),
            Self::SetTarget { target } => camera.set_target(target),
            Self::SetUp { up } => camera.set_up_vector(up),
            Self::MoveGlobal { delta } => camera.move_global(delta),
            Self::MovePosition { delta } => camera.move_position(delta),
            Self::RevolveVertical { angle } => camera.revolve_vertical(angle),
            Self::RevolveHorizontal { angle } => camera.revolve_horizontal(angle),
            Self::Truck { distance } => camera.truck(distance),
            Self::Pedestal { distance } => camera.pedestal(distance),
            Self::Dolly { distance } => camera.dolly(distance),
            Self::Tilt { angle } => camera.tilt(angle),
            Self::Pan { angle } => camera.pan(angle),
            Self::Roll { angle } => camera.roll(angle),
        }
    }

    /// Whether the move keeps the camera's orientation (a rigid translation).
    pub fn is_translation(&self) -> bool {
        matches!(
            self,
            Self::MoveGlobal { .. } | Self::Truck { .. } | Self::Pedestal { .. } | Self::Dolly { .. }
        )
    }
}

/// Apply a sequence of moves in order.
pub fn apply_all<'a>(camera: &mut Camera, moves: impl IntoIterator<Item = &'a CameraMove>) {
    for m in moves {
        m.apply(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn apply_dispatches_to_the_operator() {
        let mut via_move = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut direct = via_move.clone();

        CameraMove::Truck { distance: 2.0 }.apply(&mut via_move);
        direct.truck(2.0);
        assert_eq!(via_move.position(), direct.position());
        assert_eq!(via_move.target(), direct.target());

        CameraMove::Pan { angle: 0.4 }.apply(&mut via_move);
        direct.pan(0.4);
        assert!(via_move.target().abs_diff_eq(direct.target(), EPS));
    }

    #[test]
    fn translations_keep_orientation() {
        let moves = [
            CameraMove::MoveGlobal { delta: Vec3::new(1.0, -2.0, 0.5) },
            CameraMove::Truck { distance: 1.0 },
            CameraMove::Pedestal { distance: -0.5 },
            CameraMove::Dolly { distance: 2.0 },
        ];
        let mut cam = Camera::new(Vec3::new(2.0, 1.0, 4.0), Vec3::ZERO);
        let direction = cam.direction();
        for m in &moves {
            assert!(m.is_translation());
            m.apply(&mut cam);
            assert!(cam.frame_status().direction);
            assert_eq!(cam.direction(), direction);
        }
        assert!(!CameraMove::Tilt { angle: 0.1 }.is_translation());
    }

    #[test]
    fn apply_all_runs_in_order() {
        let mut cam = Camera::default();
        apply_all(
            &mut cam,
            &[
                CameraMove::SetPosition { position: Vec3::new(0.0, 0.0, 10.0) },
                CameraMove::SetTarget { target: Vec3::new(0.0, 0.0, 2.0) },
                CameraMove::MovePosition { delta: Vec3::new(0.0, 0.0, -3.0) },
            ],
        );
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 7.0));
        assert!((cam.distance() - 5.0).abs() < EPS);
    }

    #[test]
    fn deserializes_tagged_moves() {
        let json = r#"[
            {"kind": "truck", "distance": 2.0},
            {"kind": "move_global", "delta": [1.0, 0.0, 0.0]},
            {"kind": "revolve_horizontal", "angle": 0.5}
        ]"#;
        let moves: Vec<CameraMove> = serde_json::from_str(json).unwrap();
        assert_eq!(moves[0], CameraMove::Truck { distance: 2.0 });
        assert_eq!(moves[1], CameraMove::MoveGlobal { delta: Vec3::X });
        assert_eq!(moves[2], CameraMove::RevolveHorizontal { angle: 0.5 });
    }
}
