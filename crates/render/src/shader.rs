use std::io;
use std::path::{Path, PathBuf};

use crate::backend::{GraphicsBackend, ProgramId, ShaderStage};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("could not read {stage} shader {}: {source}", .path.display())]
    Read {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
}

/// Compile a vertex and fragment shader and link them into a program.
///
/// The stage objects are deleted once linking has been attempted, whatever
/// the outcome; only the program survives.
pub fn build_program<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<ProgramId, ShaderError> {
    let vertex = backend
        .compile_shader(ShaderStage::Vertex, vertex_src)
        .map_err(|log| ShaderError::Compile {
            stage: ShaderStage::Vertex,
            log,
        })?;
    let fragment = match backend.compile_shader(ShaderStage::Fragment, fragment_src) {
        Ok(f) => f,
        Err(log) => {
            backend.delete_shader(vertex);
            return Err(ShaderError::Compile {
                stage: ShaderStage::Fragment,
                log,
            });
        }
    };

    let linked = backend.link_program(vertex, fragment);
    backend.delete_shader(vertex);
    backend.delete_shader(fragment);

    let program = linked.map_err(|log| ShaderError::Link { log })?;
    tracing::debug!(program = program.0, "linked shader program");
    Ok(program)
}

/// Read both shader sources from disk, then [`build_program`].
pub fn load_program<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<ProgramId, ShaderError> {
    let vertex_src = read_source(ShaderStage::Vertex, vertex_path)?;
    let fragment_src = read_source(ShaderStage::Fragment, fragment_path)?;
    build_program(backend, &vertex_src, &fragment_src)
}

fn read_source(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, HeadlessBackend};

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() {}";

    fn deleted(backend: &HeadlessBackend) -> usize {
        backend
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::DeleteShader(_)))
            .count()
    }

    #[test]
    fn builds_and_cleans_up_stage_objects() {
        let mut backend = HeadlessBackend::new();
        let program = build_program(&mut backend, VS, FS).unwrap();
        assert!(backend.is_program(program));
        assert_eq!(deleted(&backend), 2);
    }

    #[test]
    fn fragment_failure_releases_the_vertex_shader() {
        let mut backend = HeadlessBackend::new();
        let err = build_program(&mut backend, VS, "").unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("empty"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(deleted(&backend), 1);
    }

    #[test]
    fn vertex_failure_names_the_stage() {
        let mut backend = HeadlessBackend::new();
        let err = build_program(&mut backend, "int x;", FS).unwrap_err();
        assert!(err.to_string().starts_with("vertex shader failed to compile"));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("basic.vert");
        let fs = dir.path().join("basic.frag");
        std::fs::write(&vs, VS).unwrap();
        std::fs::write(&fs, FS).unwrap();

        let mut backend = HeadlessBackend::new();
        assert!(load_program(&mut backend, &vs, &fs).is_ok());

        let missing = dir.path().join("missing.frag");
        let err = load_program(&mut backend, &vs, &missing).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Read {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert!(err.to_string().contains("missing.frag"));
    }
}
