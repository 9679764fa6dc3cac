//! Command-line argument parsing for the orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ScenePreset};

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated sun, planet and moon")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Built-in scene to run.
    #[arg(long, value_enum)]
    pub preset: Option<ScenePreset>,

    /// RON scene definition to run instead of a preset.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Directory containing per-body texture folders.
    #[arg(long)]
    pub textures: Option<String>,

    /// Stop after this many frames.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Frames per second requested from the scheduler.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(preset) = args.preset {
            self.scene.preset = preset;
        }
        if let Some(ref path) = args.scene {
            self.scene.scene_file = Some(path.clone());
        }
        if let Some(ref root) = args.textures {
            self.scene.texture_root = root.clone();
        }
        if let Some(frames) = args.frames {
            self.scene.max_frames = Some(frames);
        }
        if let Some(fps) = args.fps {
            self.render.target_fps = fps;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
