//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for the terrain lighting pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Heightfield and scene extents.
    pub terrain: TerrainConfig,
    /// Per-vertex lighting settings.
    pub lighting: LightingConfig,
    /// Water volume, attenuation and boundary settings.
    pub water: WaterConfig,
    /// Underwater caustics settings.
    pub caustics: CausticsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Heightfield and scene extent configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Half-extent of the scene along X, in world units.
    pub x_scene_size: f32,
    /// Half-extent of the scene along Y, in world units.
    pub y_scene_size: f32,
    /// Half-extent of the scene along Z, in world units.
    pub z_scene_size: f32,
    /// World units to physical distance scale used for water path lengths.
    pub mesh_scale: f32,
    /// Seed for the procedural heightfield.
    pub seed: u64,
    /// Amplitude of the first heightfield octave.
    pub amplitude: f64,
    /// Frequency of the first heightfield octave.
    pub base_frequency: f64,
    /// Number of heightfield octaves.
    pub octaves: u32,
    /// Vertex pairs entirely below this height are not drawn.
    pub z_cutoff: Option<f32>,
}

/// Per-vertex lighting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Base diffuse intensity of an undamaged, unlit vertex.
    pub diffuse: f32,
    /// Surface damage healed per elapsed tick.
    pub heal_rate: f32,
    /// Upper bound on surface damage.
    pub max_damage: f32,
    /// Multiplier applied to dynamic point light contributions.
    pub dynamic_light_scale: f32,
    /// Whether dynamic point lights are sampled at all.
    pub dynamic_lights: bool,
    /// Quality tier: 0 disables caustics, 2 and above enables cloud shadows.
    pub ground_effects_level: u8,
    /// Snow cover disables cloud shadowing.
    pub has_snow: bool,
    /// Combined-universe mode hides the moon from cloud shadowing.
    pub combined_universe: bool,
    /// Shadows are resolved by a shadow-map shader instead of per vertex.
    pub shadow_map_shader: bool,
    /// Lower bound on the normal scale so dynamic lighting keeps a direction.
    pub normal_floor: f32,
    /// Cloud density to opacity multiplier.
    pub cloud_opacity_steepness: f32,
}

/// Water volume configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Master switch for water rendering and underwater lighting.
    pub enabled: bool,
    /// Scene is an open ocean (caustics are not projected).
    pub open_ocean: bool,
    /// Height of the global water plane.
    pub plane_z: f32,
    /// Distance multiplier applied before attenuation.
    pub color_attenuation: f32,
    /// Extra attenuation multiplier for interior or unclassified water.
    pub interior_scale: f32,
    /// Per-channel absorption coefficients (RGB).
    pub absorption: [f32; 3],
    /// Index of refraction of water relative to air.
    pub refraction_index: f32,
    /// Tint applied to interior (contained) water bodies.
    pub liquid_color: [f32; 3],
    /// Base color of the boundary faces (RGBA).
    pub boundary_color: [f32; 4],
    /// Only emit boundary quads where terrain dips below the water.
    pub skip_dry_edges: bool,
    /// Margin below the water level that counts as submerged for boundary quads.
    pub depth_epsilon: f32,
}

/// Underwater caustics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CausticsConfig {
    /// Display-mode switch for underwater lighting.
    pub enabled: bool,
    /// Exponent applied to the caustic ratio to sharpen the pattern.
    pub sharpness: i32,
    /// Compute refracted hits for a scanline in parallel.
    pub parallel: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Number of frames the demo renders before exiting.
    pub frames: u32,
    /// Log per-pass statistics at info level.
    pub show_pass_stats: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            x_scene_size: 4.0,
            y_scene_size: 4.0,
            z_scene_size: 2.0,
            mesh_scale: 1.0,
            seed: 0,
            amplitude: 1.0,
            base_frequency: 0.35,
            octaves: 5,
            z_cutoff: None,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            diffuse: 0.8,
            heal_rate: 0.005,
            max_damage: 20.0,
            dynamic_light_scale: 4.0,
            dynamic_lights: true,
            ground_effects_level: 2,
            has_snow: false,
            combined_universe: false,
            shadow_map_shader: false,
            normal_floor: 0.01,
            cloud_opacity_steepness: 1.7,
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_ocean: false,
            plane_z: 0.0,
            color_attenuation: 1.5,
            interior_scale: 4.0,
            absorption: [1.2, 0.45, 0.2],
            refraction_index: 1.333,
            liquid_color: [0.55, 0.75, 0.6],
            boundary_color: [0.3, 0.5, 0.8, 0.5],
            skip_dry_edges: true,
            depth_epsilon: 1e-3,
        }
    }
}

impl Default for CausticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sharpness: 8,
            parallel: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            frames: 4,
            show_pass_stats: true,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join("config.ron"))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
