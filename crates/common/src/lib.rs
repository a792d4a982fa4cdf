//! Shared types used across the camrig crates.
//!
//! Nothing in here owns a GPU resource: handles are plain integers issued by
//! whatever `GraphicsBackend` is in use.

mod types;

pub use types::{TextureId, Vertex};
