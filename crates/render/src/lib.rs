//! Render glue: a backend-agnostic context that owns shader programs and the
//! model/view/projection matrices, uploads meshes and binds material textures.
//!
//! # Invariants
//! - Rendering reads camera state, it never mutates it.
//! - Matrix setters store their value even when no program can receive it.
//!
//! The GPU sits behind [`GraphicsBackend`]. [`HeadlessBackend`] records calls
//! instead of drawing, so the whole pipeline runs in tests and on machines
//! without a display.

mod backend;
mod config;
mod context;
mod renderer;
mod shader;
mod uniforms;

pub use backend::{
    BackendCall, GraphicsBackend, HeadlessBackend, MeshHandle, ProgramId, ShaderHandle,
    ShaderStage, UniformLocation, UniformValue,
};
pub use config::{ContextConfig, ProjectionConfig};
pub use context::{GpuMesh, GpuModel, RenderContext, RenderError};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use shader::{ShaderError, build_program, load_program};
pub use uniforms::{VIEW_BLOCK, ViewUniforms};

pub fn crate_info() -> &'static str {
    concat!("camrig-render v", env!("CARGO_PKG_VERSION"))
}
