//! Command-line argument parsing for the Shoreline demo.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Shoreline command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "shoreline", about = "Headless terrain and water lighting driver")]
pub struct CliArgs {
    /// Grid columns.
    #[arg(long)]
    pub width: Option<u32>,

    /// Grid rows.
    #[arg(long)]
    pub height: Option<u32>,

    /// Heightfield seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames to render.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Ground effects quality tier (0-2).
    #[arg(long)]
    pub ground_effects: Option<u8>,

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
            self.terrain.width = w;
        }
        if let Some(h) = args.height {
            self.terrain.height = h;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(frames) = args.frames {
            self.debug.frames = frames;
        }
        if let Some(level) = args.ground_effects {
            self.lighting.ground_effects_level = level;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
