use std::path::Path;

use camrig_assets::{AssetError, Model, Texture, TextureKind, TextureLoader};
use camrig_camera::{Camera, FrameError};
use camrig_common::{TextureId, Vertex};
use glam::{Mat4, Quat, Vec2};

use crate::backend::{GraphicsBackend, MeshHandle, ProgramId, UniformValue};
use crate::config::ContextConfig;
use crate::shader::{self, ShaderError};
use crate::uniforms::{VIEW_BLOCK, ViewUniforms};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("camera has no usable frame: {0}")]
    Camera(#[from] FrameError),
}

/// A mesh resident on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuMesh {
    pub handle: MeshHandle,
    pub index_count: u32,
    pub textures: Vec<Texture>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuModel {
    pub name: String,
    pub meshes: Vec<GpuMesh>,
}

/// Owns a graphics backend plus the shader programs and transform
/// matrices of one window.
///
/// Matrix setters always store the new value; they upload it only when the
/// current program has a matching `model`, `view` or `proj` uniform.
pub struct RenderContext<B> {
    backend: B,
    config: ContextConfig,
    programs: Vec<ProgramId>,
    current: Option<usize>,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl<B: GraphicsBackend> RenderContext<B> {
    pub fn new(backend: B, config: ContextConfig) -> Self {
        tracing::info!(
            title = %config.title,
            width = config.width,
            height = config.height,
            samples = config.samples,
            "render context created"
        );
        Self {
            backend,
            config,
            programs: Vec::new(),
            current: None,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Load, compile and link a program from two shader files.
    /// Returns its index in this context.
    pub fn add_shader_program(
        &mut self,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<usize, RenderError> {
        let program = shader::load_program(&mut self.backend, vertex_path, fragment_path)?;
        Ok(self.register(program))
    }

    pub fn add_shader_program_from_source(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<usize, RenderError> {
        let program = shader::build_program(&mut self.backend, vertex_src, fragment_src)?;
        Ok(self.register(program))
    }

    fn register(&mut self, program: ProgramId) -> usize {
        self.programs.push(program);
        let index = self.programs.len() - 1;
        if self.current.is_none() {
            self.use_shader_program(index);
        }
        index
    }

    /// Make program `index` current. Out-of-range indices and the program
    /// already in use are ignored.
    pub fn use_shader_program(&mut self, index: usize) {
        if self.current == Some(index) {
            return;
        }
        let Some(&program) = self.programs.get(index) else {
            tracing::debug!(index, available = self.programs.len(), "no such shader program");
            return;
        };
        self.backend.use_program(program);
        self.current = Some(index);
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current.map(|i| self.programs[i])
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Width over height of the framebuffer, if there is a drawable one.
    pub fn aspect_ratio(&self) -> Option<f32> {
        let size = self.backend.framebuffer_size()?;
        (size.x > 0 && size.y > 0).then(|| size.x as f32 / size.y as f32)
    }

    /// Perspective projection for the current framebuffer. `fov` is the
    /// vertical field of view in radians. Without a framebuffer this is the
    /// identity.
    pub fn calc_proj_persp(&self, fov: f32, near: f32, far: f32) -> Mat4 {
        match self.aspect_ratio() {
            Some(aspect) => Mat4::perspective_rh_gl(fov, aspect, near, far),
            None => Mat4::IDENTITY,
        }
    }

    pub fn model_mat(&self) -> Mat4 {
        self.model
    }

    pub fn view_mat(&self) -> Mat4 {
        self.view
    }

    pub fn projection_mat(&self) -> Mat4 {
        self.projection
    }

    pub fn set_model_mat(&mut self, model: Mat4) {
        self.model = model;
        self.set_uniform("model", UniformValue::Mat4(model));
    }

    /// Model matrix for a flat object at `position`, rotated `rotation`
    /// radians about the Z axis.
    pub fn set_model_2d(&mut self, position: Vec2, rotation: f32) {
        let model = Mat4::from_rotation_translation(
            Quat::from_rotation_z(rotation),
            position.extend(0.0),
        );
        self.set_model_mat(model);
    }

    pub fn set_view_mat(&mut self, view: Mat4) {
        self.view = view;
        self.set_uniform("view", UniformValue::Mat4(view));
    }

    pub fn set_projection_mat(&mut self, projection: Mat4) {
        self.projection = projection;
        self.set_uniform("proj", UniformValue::Mat4(projection));
    }

    /// Upload the camera's view matrix, plus the [`ViewUniforms`] block built
    /// from it and the stored projection.
    pub fn upload_camera(&mut self, camera: &Camera) -> Result<(), RenderError> {
        let uniforms = ViewUniforms::from_camera(camera, self.projection)?;
        self.set_view_mat(Mat4::from_cols_array_2d(&uniforms.view));
        if let Some(program) = self.current_program() {
            self.backend
                .write_uniform_block(program, VIEW_BLOCK, uniforms.as_bytes());
        }
        tracing::debug!(position = ?camera.position(), target = ?camera.target(), "camera uploaded");
        Ok(())
    }

    pub fn upload_model(&mut self, model: &Model) -> GpuModel {
        let meshes: Vec<GpuMesh> = model
            .meshes
            .iter()
            .map(|mesh| GpuMesh {
                handle: self.backend.upload_mesh(
                    bytemuck::cast_slice(&mesh.vertices),
                    size_of::<Vertex>(),
                    &mesh.indices,
                ),
                index_count: mesh.indices.len() as u32,
                textures: mesh.textures.clone(),
            })
            .collect();
        tracing::debug!(model = %model.name, meshes = meshes.len(), "model uploaded");
        GpuModel {
            name: model.name.clone(),
            meshes,
        }
    }

    pub fn draw_model(&mut self, model: &GpuModel) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh);
        }
    }

    /// Bind each texture to its own unit, point the matching
    /// `material.texture_<kind>[n]` sampler at it, then draw.
    pub fn draw_mesh(&mut self, mesh: &GpuMesh) {
        let mut diffuse = 0u32;
        let mut specular = 0u32;
        for (unit, texture) in mesh.textures.iter().enumerate() {
            let n = match texture.kind {
                TextureKind::Diffuse => {
                    diffuse += 1;
                    diffuse
                }
                TextureKind::Specular => {
                    specular += 1;
                    specular
                }
            };
            let name = format!("material.{}[{n}]", texture.kind.uniform_name());
            self.set_uniform(&name, UniformValue::Int(unit as i32));
            self.backend.bind_texture(unit as u32, texture.id);
        }
        self.set_uniform("material.num_tex_diffuse", UniformValue::Uint(diffuse));
        self.set_uniform("material.num_tex_specular", UniformValue::Uint(specular));
        self.backend.draw_indexed(mesh.handle, mesh.index_count);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(program) = self.current_program() else {
            return false;
        };
        if !self.backend.is_program(program) {
            return false;
        }
        match self.backend.uniform_location(program, name) {
            Some(location) => {
                self.backend.set_uniform(location, value);
                true
            }
            None => {
                tracing::trace!(uniform = name, "uniform not in current program");
                false
            }
        }
    }
}

impl<B: GraphicsBackend> TextureLoader for RenderContext<B> {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, AssetError> {
        self.backend
            .create_texture(path)
            .map_err(|reason| AssetError::Texture {
                path: path.to_path_buf(),
                reason,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, HeadlessBackend};
    use camrig_assets::{ImportOptions, Mesh};
    use glam::{Vec3, Vec4};
    use std::path::PathBuf;

    const VS: &str = "void main() { gl_Position = proj * view * model * vec4(pos, 1.0); }";
    const FS: &str = "void main() {}";

    fn context() -> RenderContext<HeadlessBackend> {
        RenderContext::new(
            HeadlessBackend::with_framebuffer(800, 600),
            ContextConfig::default(),
        )
    }

    fn use_calls(ctx: &RenderContext<HeadlessBackend>) -> usize {
        ctx.backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::UseProgram(_)))
            .count()
    }

    #[test]
    fn first_program_becomes_current() {
        let mut ctx = context();
        assert_eq!(ctx.current_program(), None);
        let first = ctx.add_shader_program_from_source(VS, FS).unwrap();
        let second = ctx.add_shader_program_from_source(VS, FS).unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(ctx.program_count(), 2);
        assert_eq!(use_calls(&ctx), 1);
        assert_ne!(ctx.current_program(), None);
    }

    #[test]
    fn use_program_ignores_current_and_out_of_range() {
        let mut ctx = context();
        ctx.add_shader_program_from_source(VS, FS).unwrap();
        ctx.add_shader_program_from_source(VS, FS).unwrap();
        let first = ctx.current_program();

        ctx.use_shader_program(0);
        ctx.use_shader_program(7);
        assert_eq!(use_calls(&ctx), 1);
        assert_eq!(ctx.current_program(), first);

        ctx.use_shader_program(1);
        assert_eq!(use_calls(&ctx), 2);
        assert_ne!(ctx.current_program(), first);
    }

    #[test]
    fn failed_program_is_not_registered() {
        let mut ctx = context();
        let err = ctx.add_shader_program_from_source("", FS).unwrap_err();
        assert!(matches!(err, RenderError::Shader(ShaderError::Compile { .. })));
        assert_eq!(ctx.program_count(), 0);
        assert_eq!(ctx.current_program(), None);
    }

    #[test]
    fn program_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vert");
        let fs = dir.path().join("a.frag");
        std::fs::write(&vs, VS).unwrap();
        std::fs::write(&fs, FS).unwrap();

        let mut ctx = context();
        assert_eq!(ctx.add_shader_program(&vs, &fs).unwrap(), 0);
        assert!(ctx.add_shader_program(&vs, &dir.path().join("nope.frag")).is_err());
        assert_eq!(ctx.program_count(), 1);
    }

    #[test]
    fn perspective_uses_framebuffer_aspect() {
        let ctx = context();
        let proj = ctx.calc_proj_persp(1.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh_gl(1.0, 800.0 / 600.0, 0.1, 100.0);
        assert!(proj.abs_diff_eq(expected, 1e-6));

        let headless = RenderContext::new(HeadlessBackend::new(), ContextConfig::default());
        assert_eq!(headless.calc_proj_persp(1.0, 0.1, 100.0), Mat4::IDENTITY);

        let flat = RenderContext::new(HeadlessBackend::with_framebuffer(800, 0), ContextConfig::default());
        assert_eq!(flat.calc_proj_persp(1.0, 0.1, 100.0), Mat4::IDENTITY);
    }

    #[test]
    fn matrices_are_stored_and_uploaded() {
        let mut ctx = context();
        ctx.add_shader_program_from_source(VS, FS).unwrap();

        let proj = ctx.calc_proj_persp(1.0, 0.1, 100.0);
        ctx.set_projection_mat(proj);
        assert_eq!(ctx.projection_mat(), proj);
        assert_eq!(ctx.backend().uniform("proj"), Some(UniformValue::Mat4(proj)));

        ctx.set_model_2d(Vec2::new(3.0, 4.0), std::f32::consts::FRAC_PI_2);
        let moved = ctx.model_mat() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(moved.abs_diff_eq(Vec4::new(3.0, 5.0, 0.0, 1.0), 1e-6));
        assert_eq!(
            ctx.backend().uniform("model"),
            Some(UniformValue::Mat4(ctx.model_mat()))
        );
    }

    #[test]
    fn matrices_without_program_or_uniform_are_only_stored() {
        let mut ctx = context();
        ctx.set_model_mat(Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(ctx.model_mat(), Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(ctx.backend().uniform("model"), None);

        ctx.backend_mut().hide_uniform("view");
        ctx.add_shader_program_from_source(VS, FS).unwrap();
        ctx.set_view_mat(Mat4::from_translation(Vec3::X));
        assert_eq!(ctx.view_mat(), Mat4::from_translation(Vec3::X));
        assert_eq!(ctx.backend().uniform("view"), None);
    }

    #[test]
    fn camera_upload_writes_view_and_block() {
        let mut ctx = context();
        ctx.add_shader_program_from_source(VS, FS).unwrap();
        let cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        ctx.upload_camera(&cam).unwrap();

        assert_eq!(ctx.view_mat(), cam.view_matrix());
        assert_eq!(
            ctx.backend().uniform("view"),
            Some(UniformValue::Mat4(cam.view_matrix()))
        );
        assert!(ctx.backend().calls().iter().any(|c| matches!(
            c,
            BackendCall::WriteUniformBlock { name, size: 208, .. } if name == VIEW_BLOCK
        )));
    }

    #[test]
    fn degenerate_camera_upload_fails_and_keeps_view() {
        let mut ctx = context();
        ctx.add_shader_program_from_source(VS, FS).unwrap();
        let cam = Camera::new(Vec3::ONE, Vec3::ONE);
        let err = ctx.upload_camera(&cam).unwrap_err();
        assert!(matches!(err, RenderError::Camera(FrameError::CoincidentTarget(_))));
        assert_eq!(ctx.view_mat(), Mat4::IDENTITY);
    }

    fn texture(id: u32, kind: TextureKind) -> Texture {
        Texture {
            id: TextureId(id),
            kind,
            path: PathBuf::from(format!("tex{id}.png")),
        }
    }

    #[test]
    fn draw_binds_textures_and_material_counts() {
        let mut ctx = context();
        ctx.add_shader_program_from_source(VS, FS).unwrap();

        let vertices = vec![Vertex::default(); 4];
        let mesh = Mesh::new(
            "quad",
            vertices,
            vec![0, 1, 2, 2, 3, 0],
            vec![
                texture(10, TextureKind::Diffuse),
                texture(11, TextureKind::Specular),
                texture(12, TextureKind::Diffuse),
            ],
        );
        let model = Model {
            name: "quad".into(),
            meshes: vec![mesh],
            ..Model::default()
        };

        let gpu = ctx.upload_model(&model);
        assert_eq!(gpu.meshes.len(), 1);
        assert!(ctx.backend().calls().iter().any(|c| matches!(
            c,
            BackendCall::UploadMesh { vertex_bytes: 128, index_count: 6, .. }
        )));

        ctx.backend_mut().take_calls();
        ctx.draw_model(&gpu);
        let backend = ctx.backend();

        assert_eq!(
            backend.uniform("material.texture_diffuse[1]"),
            Some(UniformValue::Int(0))
        );
        assert_eq!(
            backend.uniform("material.texture_specular[1]"),
            Some(UniformValue::Int(1))
        );
        assert_eq!(
            backend.uniform("material.texture_diffuse[2]"),
            Some(UniformValue::Int(2))
        );
        assert_eq!(
            backend.uniform("material.num_tex_diffuse"),
            Some(UniformValue::Uint(2))
        );
        assert_eq!(
            backend.uniform("material.num_tex_specular"),
            Some(UniformValue::Uint(1))
        );

        let binds: Vec<(u32, u32)> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::BindTexture { unit, texture } => Some((*unit, texture.0)),
                _ => None,
            })
            .collect();
        assert_eq!(binds, vec![(0, 10), (1, 11), (2, 12)]);
        assert_eq!(
            backend.calls().last(),
            Some(&BackendCall::DrawIndexed {
                mesh: gpu.meshes[0].handle,
                index_count: 6
            })
        );
    }

    #[test]
    fn model_import_loads_textures_through_the_backend() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wall.png"), b"png").unwrap();
        std::fs::write(
            dir.path().join("wall.mtl"),
            "newmtl brick\nmap_Kd wall.png\nmap_Ks shine.png\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("wall.obj"),
            "mtllib wall.mtl\no wall\nv 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nusemtl brick\nf 1/1 2/2 3/3\n",
        )
        .unwrap();

        let mut ctx = context();
        let model = Model::load(
            &dir.path().join("wall.obj"),
            &ImportOptions::default(),
            &mut ctx,
        )
        .unwrap();

        // shine.png does not exist, so only the diffuse map survives.
        assert_eq!(model.textures.len(), 1);
        assert_eq!(model.textures[0].kind, TextureKind::Diffuse);
        assert!(ctx.backend().calls().iter().any(|c| matches!(
            c,
            BackendCall::CreateTexture { path, .. } if path.ends_with("wall.png")
        )));
    }
}
