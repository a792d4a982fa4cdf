use std::fmt::Write;

use camrig_camera::Camera;
use glam::{Mat4, Vec3};

/// What a renderer looks through: a camera plus the projection in use.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub camera: &'a Camera,
    pub projection: Mat4,
}

impl<'a> RenderView<'a> {
    pub fn new(camera: &'a Camera, projection: Mat4) -> Self {
        Self { camera, projection }
    }
}

/// Renderer-agnostic interface. Renderers read the view and never move the camera.
pub trait Renderer {
    type Output;

    fn render(&self, view: &RenderView<'_>) -> Self::Output;
}

/// Human-readable report of a camera frame, for logs and the command line.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

fn write_matrix(out: &mut String, label: &str, m: Mat4) {
    let _ = writeln!(out, "{label}:");
    for row in 0..4 {
        let r = m.row(row);
        let _ = writeln!(
            out,
            "  [{:>9.4} {:>9.4} {:>9.4} {:>9.4}]",
            r.x, r.y, r.z, r.w
        );
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &RenderView<'_>) -> String {
        let cam = view.camera;
        let mut out = String::new();
        let _ = writeln!(out, "=== Camera Frame ===");
        let _ = writeln!(
            out,
            "Eye: {} Target: {} World up: {}",
            vec3(cam.position()),
            vec3(cam.target()),
            vec3(cam.up_vector())
        );
        let _ = writeln!(out, "Distance: {:.3}", cam.distance());

        match cam.try_frame() {
            Ok(frame) => {
                let _ = writeln!(out, "Direction: {}", vec3(frame.direction));
                let _ = writeln!(out, "Right: {}", vec3(frame.right));
                let _ = writeln!(out, "Up: {}", vec3(frame.up));
                write_matrix(&mut out, "View", frame.view);
                write_matrix(&mut out, "View-projection", view.projection * frame.view);
            }
            Err(err) => {
                let _ = writeln!(out, "Frame: degenerate ({err})");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_for_a_valid_camera() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let output = DebugTextRenderer::new().render(&RenderView::new(&cam, Mat4::IDENTITY));

        assert!(output.starts_with("=== Camera Frame ==="));
        assert!(output.contains("Distance: 5.000"));
        assert!(output.contains("Direction: (0.000, 0.000, 1.000)"));
        assert!(output.contains("View-projection:"));
        // Translation row of the view matrix.
        assert!(output.contains("-5.0000]"));
    }

    #[test]
    fn report_for_a_degenerate_camera() {
        let cam = Camera::new(Vec3::ONE, Vec3::ONE);
        let output = DebugTextRenderer::new().render(&RenderView::new(&cam, Mat4::IDENTITY));
        assert!(output.contains("Frame: degenerate"));
        assert!(!output.contains("View:"));
    }
}
