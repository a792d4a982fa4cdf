use bytemuck::{Pod, Zeroable};
use camrig_camera::{Camera, FrameError};
use glam::{Mat4, Vec3};

/// Name of the uniform block [`ViewUniforms`] is written to.
pub const VIEW_BLOCK: &str = "View";

/// Per-frame camera data laid out for a std140 uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// World-space eye position, `w` = 1.
    pub eye: [f32; 4],
}

impl ViewUniforms {
    pub fn new(view: Mat4, projection: Mat4, eye: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            view_proj: (projection * view).to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
        }
    }

    pub fn from_camera(camera: &Camera, projection: Mat4) -> Result<Self, FrameError> {
        let view = camera.try_view_matrix()?;
        Ok(Self::new(view, projection, camera.position()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<ViewUniforms>(), 3 * 64 + 16);
        let u = ViewUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(u.as_bytes().len(), 208);
    }

    #[test]
    fn view_proj_is_projection_after_view() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let proj = Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 50.0);
        let u = ViewUniforms::from_camera(&cam, proj).unwrap();
        let expected = proj * cam.view_matrix();
        assert!(Mat4::from_cols_array_2d(&u.view_proj).abs_diff_eq(expected, 1e-6));
        assert_eq!(u.eye, [0.0, 0.0, 5.0, 1.0]);
    }

    #[test]
    fn degenerate_camera_is_rejected() {
        let cam = Camera::new(Vec3::ONE, Vec3::ONE);
        assert!(ViewUniforms::from_camera(&cam, Mat4::IDENTITY).is_err());
    }
}
