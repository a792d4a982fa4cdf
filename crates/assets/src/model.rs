use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use camrig_common::{TextureId, Vertex};
use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::mesh::{Mesh, Texture, TextureKind};
use crate::AssetError;

/// Turns a texture file into a backend texture handle.
///
/// Decoding and upload are the implementor's business; the importer only
/// decides which files to ask for.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, AssetError>;
}

/// Post-processing applied while importing a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Store `v` as `1 - v`, for image loaders whose first row is the top of the image.
    pub flip_uvs: bool,
    /// Compute smooth normals for meshes that carry none.
    pub generate_normals: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            flip_uvs: true,
            generate_normals: true,
        }
    }
}

/// A model imported from a Wavefront OBJ file, split into one [`Mesh`] per object.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    /// Directory texture paths are resolved against.
    pub directory: PathBuf,
    /// Every texture loaded for this model, each file once.
    pub textures: Vec<Texture>,
}

impl Model {
    /// Import `path`, loading material textures through `loader`.
    ///
    /// Faces are triangulated. A missing material library or a texture the
    /// loader rejects is logged and skipped; only an unreadable OBJ fails.
    pub fn load(
        path: impl AsRef<Path>,
        options: &ImportOptions,
        loader: &mut impl TextureLoader,
    ) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let _span = tracing::info_span!("import_model", path = %path.display()).entered();

        let (objects, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|err| {
            tracing::warn!(%err, "no usable material library, meshes will be untextured");
            Vec::new()
        });

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut cache = TextureCache::new(directory.clone());
        let mut meshes = Vec::with_capacity(objects.len());

        for object in &objects {
            let textures = match object.mesh.material_id.and_then(|i| materials.get(i)) {
                Some(material) => cache.material_textures(material, loader),
                None => Vec::new(),
            };
            let mesh = convert_mesh(&object.name, &object.mesh, textures, options);
            tracing::debug!(
                name = %mesh.name,
                vertices = mesh.vertices.len(),
                triangles = mesh.triangle_count(),
                textures = mesh.textures.len(),
                "imported mesh"
            );
            meshes.push(mesh);
        }

        if meshes.is_empty() {
            tracing::warn!("model contains no meshes");
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            meshes,
            directory,
            textures: cache.into_loaded(),
        })
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            meshes: self.meshes.len(),
            vertices: self.meshes.iter().map(|m| m.vertices.len()).sum(),
            triangles: self.meshes.iter().map(Mesh::triangle_count).sum(),
            textures: self
                .textures
                .iter()
                .map(|t| t.path.display().to_string())
                .collect(),
        }
    }
}

/// Counts for a loaded model, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub textures: Vec<String>,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model '{}': meshes={} vertices={} triangles={} textures={}",
            self.name,
            self.meshes,
            self.vertices,
            self.triangles,
            self.textures.len()
        )
    }
}

/// Per-model texture de-duplication keyed by resolved file path.
struct TextureCache {
    directory: PathBuf,
    loaded: BTreeMap<PathBuf, Texture>,
    order: Vec<PathBuf>,
}

impl TextureCache {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            loaded: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    fn material_textures(
        &mut self,
        material: &tobj::Material,
        loader: &mut impl TextureLoader,
    ) -> Vec<Texture> {
        let wanted = [
            (TextureKind::Diffuse, material.diffuse_texture.as_deref()),
            (TextureKind::Specular, material.specular_texture.as_deref()),
        ];
        wanted
            .into_iter()
            .filter_map(|(kind, name)| {
                let name = name.filter(|n| !n.trim().is_empty())?;
                self.get_or_load(kind, name, loader)
            })
            .collect()
    }

    fn get_or_load(
        &mut self,
        kind: TextureKind,
        name: &str,
        loader: &mut impl TextureLoader,
    ) -> Option<Texture> {
        let path = self.directory.join(name);
        if let Some(texture) = self.loaded.get(&path) {
            return Some(Texture {
                kind,
                ..texture.clone()
            });
        }
        match loader.load_texture(&path) {
            Ok(id) => {
                let texture = Texture {
                    id,
                    kind,
                    path: path.clone(),
                };
                self.loaded.insert(path.clone(), texture.clone());
                self.order.push(path);
                Some(texture)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not load texture, skipping");
                None
            }
        }
    }

    fn into_loaded(mut self) -> Vec<Texture> {
        self.order
            .iter()
            .filter_map(|p| self.loaded.remove(p))
            .collect()
    }
}

fn convert_mesh(
    name: &str,
    source: &tobj::Mesh,
    textures: Vec<Texture>,
    options: &ImportOptions,
) -> Mesh {
    let positions: Vec<Vec3> = source
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let normals: Vec<Vec3> = if source.normals.len() == source.positions.len() {
        source
            .normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect()
    } else if options.generate_normals {
        Mesh::compute_normals(&positions, &source.indices)
    } else {
        vec![Vec3::ZERO; positions.len()]
    };

    let has_uvs = source.texcoords.len() / 2 == positions.len();
    let vertices = positions
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(i, (&position, &normal))| {
            let uv = if has_uvs {
                let (u, v) = (source.texcoords[2 * i], source.texcoords[2 * i + 1]);
                Vec2::new(u, if options.flip_uvs { 1.0 - v } else { v })
            } else {
                Vec2::ZERO
            };
            Vertex::new(position, normal, uv)
        })
        .collect();

    Mesh::new(name, vertices, source.indices.clone(), textures)
}
