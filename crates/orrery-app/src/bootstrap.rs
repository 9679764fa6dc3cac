//! Wires configuration, logging, the scene and the frame loop together.

use orrery_assets::{ImageTextureLoader, LoaderError};
use orrery_config::{CliArgs, Config, ConfigError, ScenePreset};
use orrery_materials::{NullTextureLoader, TextureLoader};
use orrery_scene::{Camera, CameraError, Scene, SceneDef, SceneError, presets};
use thiserror::Error;
use tracing::info;

use crate::clock::SystemClock;
use crate::frame_loop::{FrameLoop, FrameLoopError, PacedScheduler};
use crate::headless::HeadlessRenderer;
use crate::platform::{PlatformDirs, PlatformError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("invalid camera settings: {0}")]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    FrameLoop(#[from] FrameLoopError),
}

/// Resolve settings, start logging, then run the configured scene.
pub fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(root) => PlatformDirs::with_root(root),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);

    if let Some(log_path) =
        orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config))
    {
        info!(path = %log_path.display(), "writing JSON log");
    }
    info!(
        "{} {}x{} @ {} fps",
        config.window.title, config.window.width, config.window.height, config.render.target_fps
    );

    let frames = run_with_config(&config)?;
    info!(frames, "done");
    Ok(())
}

/// Build and run the scene described by `config`. Returns the number of
/// frames rendered.
pub fn run_with_config(config: &Config) -> Result<u64, AppError> {
    let def = scene_definition(config)?;
    let loader = texture_loader(config, &def)?;
    let scene = build_scene(config, &def, loader.as_ref())?;

    let scheduler =
        PacedScheduler::new(config.render.target_fps).with_frame_limit(config.scene.max_frames);
    let renderer = HeadlessRenderer::new(config.debug.log_transforms);
    let mut frame_loop = FrameLoop::new(scene, SystemClock::start(), renderer, scheduler);
    frame_loop.run()?;
    Ok(frame_loop.frame_count())
}

/// The scene file when one is configured, the preset otherwise.
pub fn scene_definition(config: &Config) -> Result<SceneDef, SceneError> {
    match &config.scene.scene_file {
        Some(path) => {
            info!(path = %path.display(), "loading scene file");
            SceneDef::from_ron_file(path)
        }
        None => {
            info!(preset = ?config.scene.preset, "using built-in scene");
            Ok(preset_definition(config.scene.preset))
        }
    }
}

pub fn preset_definition(preset: ScenePreset) -> SceneDef {
    match preset {
        ScenePreset::SimpleCubes => presets::simple_cubes(),
        ScenePreset::TexturedSpheres => presets::textured_spheres(),
        ScenePreset::FullyMapped => presets::fully_mapped(),
        ScenePreset::InclinedMoon => presets::inclined_moon(),
    }
}

/// Camera settings are checked before any texture is requested.
pub fn build_scene<L>(config: &Config, def: &SceneDef, loader: &L) -> Result<Scene, AppError>
where
    L: TextureLoader + ?Sized,
{
    let camera = Camera::try_looking_at_origin(
        config.render.fov_y_degrees,
        config.render.camera_distance,
        (config.window.width, config.window.height),
        config.render.near,
        config.render.far,
    )?;
    let scene = def.build(loader, &config.scene.texture_root)?;
    Ok(scene.with_camera(camera))
}

/// Decoder threads only when some body asks for textures. Zero configured
/// threads sizes the pool from the CPU count.
fn texture_loader(config: &Config, def: &SceneDef) -> Result<Box<dyn TextureLoader>, LoaderError> {
    let wants_textures = def
        .bodies
        .iter()
        .any(|body| body.material.texture_dir.is_some() && !body.material.channels.is_empty());
    if !wants_textures {
        return Ok(Box::new(NullTextureLoader));
    }
    let loader = match config.assets.loader_threads {
        0 => ImageTextureLoader::with_defaults()?,
        threads => ImageTextureLoader::new(threads)?,
    };
    info!(workers = loader.worker_count(), "texture loader started");
    Ok(Box::new(loader))
}
