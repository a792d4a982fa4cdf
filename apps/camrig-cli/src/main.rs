use std::path::{Path, PathBuf};

use anyhow::Context;
use camrig_assets::{ImportOptions, Model};
use camrig_camera::{apply_all, try_look_at};
use camrig_render::{
    ContextConfig, DebugTextRenderer, HeadlessBackend, RenderContext, RenderView, Renderer,
};
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

mod rig;

use rig::{FrameReport, RigFile, parse_vec3};

/// Pass-through program used to receive the matrix uploads of a headless run.
const FLAT_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 pos;
uniform mat4 model;
uniform mat4 view;
uniform mat4 proj;
void main() { gl_Position = proj * view * model * vec4(pos, 1.0); }
";
const FLAT_FRAGMENT: &str = "#version 330 core
out vec4 color;
void main() { color = vec4(1.0); }
";

#[derive(Parser)]
#[command(name = "camrig-cli", about = "CLI tool for camrig camera rigs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the view matrix for one eye/target/up configuration
    LookAt {
        /// Eye position as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        eye: Vec3,
        /// Target point as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,0,0")]
        target: Vec3,
        /// World up as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,1,0")]
        up: Vec3,
    },
    /// Replay a rig file and report the resulting camera frame
    Run {
        /// YAML or JSON rig file
        rig: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import an OBJ model and summarize its meshes and textures
    Model {
        path: PathBuf,
        /// Keep texture coordinates as stored in the file
        #[arg(long)]
        no_flip_uvs: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("camrig-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("camera: {}", camrig_camera::crate_info());
            println!("assets: {}", camrig_assets::crate_info());
            println!("render: {}", camrig_render::crate_info());
        }
        Commands::LookAt { eye, target, up } => {
            let view = try_look_at(eye, target, up).context("no view matrix for this configuration")?;
            for row in 0..4 {
                let r = view.row(row);
                println!("[{:>9.4} {:>9.4} {:>9.4} {:>9.4}]", r.x, r.y, r.z, r.w);
            }
        }
        Commands::Run { rig, json } => run_rig(&rig, json)?,
        Commands::Model { path, no_flip_uvs } => {
            let options = ImportOptions {
                flip_uvs: !no_flip_uvs,
                ..ImportOptions::default()
            };
            let mut ctx = RenderContext::new(HeadlessBackend::new(), ContextConfig::default());
            let model = Model::load(&path, &options, &mut ctx)?;
            let gpu = ctx.upload_model(&model);
            let summary = model.summary();

            println!("{summary}");
            for (mesh, uploaded) in model.meshes.iter().zip(&gpu.meshes) {
                println!(
                    "  mesh '{}': vertices={} triangles={} textures={} handle={}",
                    mesh.name,
                    mesh.vertices.len(),
                    mesh.triangle_count(),
                    mesh.textures.len(),
                    uploaded.handle.0
                );
            }
            for texture in &summary.textures {
                println!("  texture {texture}");
            }
        }
    }

    Ok(())
}

fn run_rig(path: &Path, json: bool) -> anyhow::Result<()> {
    let rig = RigFile::load(path)?;
    rig.camera
        .validate()
        .context("rig camera has no usable frame")?;

    let mut camera = rig.camera.build();
    apply_all(&mut camera, &rig.moves);
    tracing::info!(moves = rig.moves.len(), "rig replayed");

    let mut ctx = RenderContext::new(HeadlessBackend::from_config(&rig.context), rig.context.clone());
    ctx.add_shader_program_from_source(FLAT_VERTEX, FLAT_FRAGMENT)?;
    let projection = ctx.calc_proj_persp(
        rig.projection.fov_radians(),
        rig.projection.near,
        rig.projection.far,
    );
    ctx.set_projection_mat(projection);
    ctx.upload_camera(&camera)
        .context("camera degenerated while replaying moves")?;

    if json {
        let report = FrameReport::new(&camera, projection, rig.moves.len())?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let view = RenderView::new(&camera, projection);
        print!("{}", DebugTextRenderer::new().render(&view));
    }
    Ok(())
}
