//! Heightfield terrain data for the lighting pipeline: dense grids, scene
//! geometry, the per-frame grid bundle, collaborator service traits, and
//! heightfield ray intersection.

mod error;
mod frame;
mod geometry;
mod grid;
mod heightmap;
mod intersect;
mod source;

pub use error::TerrainError;
pub use frame::TerrainFrame;
pub use geometry::MeshGeometry;
pub use grid::Grid;
pub use heightmap::{HeightmapParams, HeightmapSampler, surface_normals};
pub use intersect::{MeshHit, interpolated_height, line_intersect_mesh};
pub use source::{
    CelestialLight, ClearSky, CloudService, DynamicLightSample, DynamicLightService,
    LightPositionService, NoDynamicLights, OBJECT_SHADOW, SHADOWED_ALL, ShadowMapService,
    TERRAIN_SHADOW, TerrainSource, WaterBody, WaterSource,
};
