//! Per-vertex terrain illumination: underwater caustics, water-depth
//! attenuation, celestial shadow blending, cloud shadows, surface damage, and
//! the row-cached vertex composer that feeds triangle-strip batches.

mod attenuation;
pub mod caustics;
mod celestial;
mod cloud;
mod composer;
mod damage;
mod gate;
mod pass;
mod refraction;
mod water_path;

pub use attenuation::{Falloff, WaterAttenuation};
pub use caustics::{CausticGrid, CausticRatio, CausticsProjector, LightPatch, ProjectionStats};
pub use celestial::{
    MOON_THRESHOLD, SUN_THRESHOLD, ShadowRegime, blend_light, celestial_light_scale,
};
pub use cloud::cloud_shadow_attenuation;
pub use composer::{ComposerSettings, FrameServices, LightingComposer, TerrainVertex};
pub use damage::{MAX_DAMAGE, SurfaceDamage};
pub use gate::{CausticsGate, SkipReason, update_caustics};
pub use pass::{GeometryEmitter, PassStats, TerrainPass};
pub use refraction::{WATER_REFRACTION_INDEX, refract};
pub use water_path::integrate_water_dist;
