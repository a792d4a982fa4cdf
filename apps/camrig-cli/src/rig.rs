use std::path::Path;

use anyhow::Context;
use camrig_camera::{Camera, CameraConfig, CameraMove};
use camrig_render::{ContextConfig, ProjectionConfig};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A camera rig: where the camera starts, the surface it renders to, and the
/// moves to replay on it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RigFile {
    pub camera: CameraConfig,
    pub context: ContextConfig,
    pub projection: ProjectionConfig,
    pub moves: Vec<CameraMove>,
}

impl RigFile {
    /// Read a rig from disk. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading rig file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let rig = if is_json {
            serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON rig {}", path.display()))?
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML rig {}", path.display()))?
        };
        Ok(rig)
    }
}

/// Machine-readable frame report printed by `run --json`.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub position: Vec3,
    pub target: Vec3,
    pub world_up: Vec3,
    pub direction: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Column-major.
    pub view: [f32; 16],
    pub view_proj: [f32; 16],
    pub moves_applied: usize,
}

impl FrameReport {
    pub fn new(camera: &Camera, projection: Mat4, moves_applied: usize) -> anyhow::Result<Self> {
        let frame = camera.try_frame().context("camera frame after moves")?;
        Ok(Self {
            position: camera.position(),
            target: camera.target(),
            world_up: camera.up_vector(),
            direction: frame.direction,
            right: frame.right,
            up: frame.up,
            view: frame.view.to_cols_array(),
            view_proj: (projection * frame.view).to_cols_array(),
            moves_applied,
        })
    }
}

/// Parse `x,y,z` into a vector.
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let component = |c: &str| {
        c.parse::<f32>()
            .map_err(|e| format!("bad component '{c}': {e}"))
    };
    Ok(Vec3::new(component(*x)?, component(*y)?, component(*z)?))
}
