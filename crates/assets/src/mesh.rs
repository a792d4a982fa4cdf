use std::path::PathBuf;

use camrig_common::{TextureId, Vertex};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a texture feeds in the material: it decides the uniform name it binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    /// Uniform array name inside the shader's `material` struct.
    pub fn uniform_name(self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
        }
    }
}

/// A loaded texture reference. Pixel data lives on the backend side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub id: TextureId,
    pub kind: TextureKind,
    pub path: PathBuf,
}

/// Triangle mesh ready for upload: interleaved vertices, `u32` indices and its textures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<Texture>,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<Texture>,
    ) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            textures,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Textures of one kind, in material order.
    pub fn textures_of(&self, kind: TextureKind) -> impl Iterator<Item = &Texture> {
        self.textures.iter().filter(move |t| t.kind == kind)
    }

    /// Smooth per-vertex normals: each triangle adds its area-weighted face
    /// normal to its three corners. Vertices no triangle touches get a zero normal.
    pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; positions.len()];
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(&pa), Some(&pb), Some(&pc)) =
                (positions.get(a), positions.get(b), positions.get(c))
            else {
                continue;
            };
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::ZERO))
            .collect()
    }
}
