//! Collaborator interfaces consumed by the lighting core.
//!
//! The core never owns these services; renderers hand in whatever backs
//! them for the current frame.

use glam::Vec3;

use crate::MeshGeometry;

/// Terrain casts a shadow onto this cell.
pub const TERRAIN_SHADOW: u8 = 0x01;
/// Scene objects cast a shadow onto this cell.
pub const OBJECT_SHADOW: u8 = 0x02;
/// Any of these bits marks a cell as fully shadowed.
pub const SHADOWED_ALL: u8 = TERRAIN_SHADOW | OBJECT_SHADOW;

/// The two celestial light sources that cast terrain shadows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CelestialLight {
    Sun,
    Moon,
}

impl CelestialLight {
    /// Slot of this light in per-light arrays.
    pub fn index(self) -> usize {
        match self {
            CelestialLight::Sun => 0,
            CelestialLight::Moon => 1,
        }
    }
}

/// Classification of the water covering a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaterBody {
    /// No water.
    #[default]
    Dry,
    /// Contained water (lake, pond) tinted by its liquid color.
    Interior,
    /// Open water connected to the scene boundary.
    Exterior,
}

/// Read-only terrain heightfield.
pub trait TerrainSource {
    fn geometry(&self) -> &MeshGeometry;

    /// Terrain elevation at a grid vertex.
    fn height(&self, x: usize, y: usize) -> f32;

    /// Precomputed unit surface normal at a grid vertex.
    fn normal(&self, x: usize, y: usize) -> Vec3;

    /// Cell removed from terrain rendering.
    fn is_cell_disabled(&self, _x: usize, _y: usize) -> bool {
        false
    }
}

/// Read-only water surface.
pub trait WaterSource {
    /// Water surface elevation at a grid vertex.
    fn level(&self, x: usize, y: usize) -> f32;

    /// Unit normal of the water surface at a grid vertex.
    fn surface_normal(&self, x: usize, y: usize) -> Vec3;

    fn body(&self, x: usize, y: usize) -> WaterBody;

    /// Tint of the liquid at a cell, applied to interior water.
    fn liquid_color(&self, x: usize, y: usize) -> Vec3;

    /// Height of the global water plane.
    fn plane_z(&self) -> f32;

    /// Highest water level anywhere in the scene.
    fn max_water_height(&self) -> f32;
}

/// Per-light shadow masks.
pub trait ShadowMapService {
    fn is_fully_shadowed(&self, light: CelestialLight, x: usize, y: usize) -> bool;

    /// A shadow-map shader resolves shadows, so per-vertex masks are ignored.
    fn is_shadow_map_active(&self) -> bool;
}

/// Contribution of dynamic point lights at a vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicLightSample {
    /// Color added to the vertex (before the dynamic light scale).
    pub color: Vec3,
    /// Multiplier on the output normal length.
    pub normal_scale: f32,
}

impl Default for DynamicLightSample {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            normal_scale: 1.0,
        }
    }
}

/// Dynamic point lights (explosions, fires, projectiles).
pub trait DynamicLightService {
    /// Whether any light source is currently enabled.
    fn has_sources(&self) -> bool;

    fn sample(&self, position: Vec3, normal: Vec3) -> DynamicLightSample;
}

/// Cloud layer density sampling.
pub trait CloudService {
    /// Density in `[0, 1]` along `direction_to_light` from `position`.
    fn density(&self, position: Vec3, direction_to_light: Vec3) -> f32;
}

/// Sun and moon placement plus the day/night blend.
pub trait LightPositionService {
    fn sun_position(&self) -> Vec3;

    fn moon_position(&self) -> Vec3;

    /// `1.0` is full day, `0.0` full night.
    fn blend_factor(&self) -> f32;

    /// Position of the light that currently dominates.
    fn dominant_position(&self) -> Vec3 {
        if self.blend_factor() >= 0.5 {
            self.sun_position()
        } else {
            self.moon_position()
        }
    }
}

/// A [`DynamicLightService`] with no lights.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDynamicLights;

impl DynamicLightService for NoDynamicLights {
    fn has_sources(&self) -> bool {
        false
    }

    fn sample(&self, _position: Vec3, _normal: Vec3) -> DynamicLightSample {
        DynamicLightSample::default()
    }
}

/// A [`CloudService`] with no clouds.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearSky;

impl CloudService for ClearSky {
    fn density(&self, _position: Vec3, _direction_to_light: Vec3) -> f32 {
        0.0
    }
}
