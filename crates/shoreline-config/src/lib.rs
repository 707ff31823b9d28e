//! Configuration system for Shoreline.
//!
//! Provides runtime-configurable settings for the terrain lighting pipeline
//! that persist to disk as RON files. Supports CLI overrides via clap,
//! hot-reload detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CausticsConfig, Config, DebugConfig, LightingConfig, TerrainConfig, WaterConfig,
};
pub use error::ConfigError;
