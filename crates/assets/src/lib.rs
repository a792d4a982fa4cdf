//! Asset loading: meshes, textures and OBJ models.
//!
//! Nothing here touches the GPU. Models come out as plain vertex/index
//! buffers plus texture handles obtained through a [`TextureLoader`]; the
//! render context uploads and draws them.

use std::path::PathBuf;

mod mesh;
mod model;

pub use mesh::{Mesh, Texture, TextureKind};
pub use model::{ImportOptions, Model, ModelSummary, TextureLoader};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read OBJ model {}: {source}", .path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to load texture {}: {reason}", .path.display())]
    Texture { path: PathBuf, reason: String },
}

pub fn crate_info() -> &'static str {
    concat!("camrig-assets v", env!("CARGO_PKG_VERSION"))
}
