use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use camrig_common::TextureId;
use glam::{Mat4, UVec2};

use crate::config::ContextConfig;

/// Pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiled, not yet linked, shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// Uploaded vertex + index buffer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Float(f32),
    Int(i32),
    Uint(u32),
}

/// The native graphics API, seen from the render context.
///
/// Implementations own windows, GPU objects and image decoding. Errors from
/// compilation and linking come back as the driver's info log.
pub trait GraphicsBackend {
    /// Drawable size in pixels, `None` when there is no window to draw into.
    fn framebuffer_size(&self) -> Option<UVec2>;

    fn create_texture(&mut self, path: &Path) -> Result<TextureId, String>;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramId, String>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn use_program(&mut self, program: ProgramId);

    fn is_program(&self, program: ProgramId) -> bool;

    /// Location of a named uniform in `program`, `None` if the program has no such uniform.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Replace the contents of a named uniform block of `program`.
    fn write_uniform_block(&mut self, program: ProgramId, name: &str, bytes: &[u8]);

    fn upload_mesh(&mut self, vertex_bytes: &[u8], stride: usize, indices: &[u32]) -> MeshHandle;

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32);
}

/// One call received by a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateTexture { path: PathBuf, id: TextureId },
    CompileShader { stage: ShaderStage, shader: ShaderHandle },
    LinkProgram { program: ProgramId },
    DeleteShader(ShaderHandle),
    UseProgram(ProgramId),
    SetUniform { name: String, value: UniformValue },
    WriteUniformBlock { program: ProgramId, name: String, size: usize },
    UploadMesh { mesh: MeshHandle, vertex_bytes: usize, index_count: usize },
    BindTexture { unit: u32, texture: TextureId },
    DrawIndexed { mesh: MeshHandle, index_count: u32 },
}

/// A backend with no GPU: it validates inputs the way a driver would and
/// records every call, for tests and offline tooling.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    framebuffer: Option<UVec2>,
    next_handle: u32,
    shaders: BTreeMap<ShaderHandle, ShaderStage>,
    programs: BTreeSet<ProgramId>,
    uniforms: Vec<String>,
    hidden_uniforms: BTreeSet<String>,
    calls: Vec<BackendCall>,
}

impl HeadlessBackend {
    /// A backend without a window.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose framebuffer matches the configured window size.
    pub fn from_config(config: &ContextConfig) -> Self {
        Self::with_framebuffer(config.width, config.height)
    }

    pub fn with_framebuffer(width: u32, height: u32) -> Self {
        Self {
            framebuffer: Some(UVec2::new(width, height)),
            ..Self::default()
        }
    }

    /// Make programs report `name` as absent, as drivers do for unused uniforms.
    pub fn hide_uniform(&mut self, name: impl Into<String>) {
        self.hidden_uniforms.insert(name.into());
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Last value set for the uniform called `name`.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::SetUniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn framebuffer_size(&self) -> Option<UVec2> {
        self.framebuffer
    }

    fn create_texture(&mut self, path: &Path) -> Result<TextureId, String> {
        if !path.is_file() {
            return Err("no such image file".into());
        }
        let id = TextureId(self.next());
        self.calls.push(BackendCall::CreateTexture {
            path: path.to_path_buf(),
            id,
        });
        Ok(id)
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        if source.trim().is_empty() {
            return Err("empty shader source".into());
        }
        if !source.contains("main") {
            return Err("no entry point `main` defined".into());
        }
        let shader = ShaderHandle(self.next());
        self.shaders.insert(shader, stage);
        self.calls.push(BackendCall::CompileShader { stage, shader });
        Ok(shader)
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramId, String> {
        match (self.shaders.get(&vertex), self.shaders.get(&fragment)) {
            (Some(ShaderStage::Vertex), Some(ShaderStage::Fragment)) => {}
            _ => return Err("program needs one vertex and one fragment shader".into()),
        }
        let program = ProgramId(self.next());
        self.programs.insert(program);
        self.calls.push(BackendCall::LinkProgram { program });
        Ok(program)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        self.calls.push(BackendCall::DeleteShader(shader));
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(BackendCall::UseProgram(program));
    }

    fn is_program(&self, program: ProgramId) -> bool {
        self.programs.contains(&program)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.contains(&program) || self.hidden_uniforms.contains(name) {
            return None;
        }
        let index = match self.uniforms.iter().position(|n| n == name) {
            Some(i) => i,
            None => {
                self.uniforms.push(name.to_owned());
                self.uniforms.len() - 1
            }
        };
        Some(UniformLocation(index as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = self
            .uniforms
            .get(location.0 as usize)
            .cloned()
            .unwrap_or_default();
        self.calls.push(BackendCall::SetUniform { name, value });
    }

    fn write_uniform_block(&mut self, program: ProgramId, name: &str, bytes: &[u8]) {
        self.calls.push(BackendCall::WriteUniformBlock {
            program,
            name: name.to_owned(),
            size: bytes.len(),
        });
    }

    fn upload_mesh(&mut self, vertex_bytes: &[u8], _stride: usize, indices: &[u32]) -> MeshHandle {
        let mesh = MeshHandle(self.next());
        self.calls.push(BackendCall::UploadMesh {
            mesh,
            vertex_bytes: vertex_bytes.len(),
            index_count: indices.len(),
        });
        mesh
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(BackendCall::BindTexture { unit, texture });
    }

    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) {
        self.calls.push(BackendCall::DrawIndexed { mesh, index_count });
    }
}
