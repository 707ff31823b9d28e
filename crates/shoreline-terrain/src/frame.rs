//! Per-frame bundle of the read-only terrain and water grids.

use glam::Vec3;

use crate::{
    CelestialLight, Grid, MeshGeometry, SHADOWED_ALL, ShadowMapService, TerrainError,
    TerrainSource, WaterBody, WaterSource,
};

/// Every read-only grid the lighting passes need for one frame.
///
/// All grids share the geometry's dimensions; the constructors and setters
/// reject anything else.
#[derive(Clone, Debug)]
pub struct TerrainFrame {
    geometry: MeshGeometry,
    heights: Grid<f32>,
    normals: Grid<Vec3>,
    water_levels: Grid<f32>,
    water_normals: Grid<Vec3>,
    water_bodies: Grid<WaterBody>,
    shadow_masks: [Grid<u8>; 2],
    disabled: Option<Grid<bool>>,
    liquid_color: Vec3,
    plane_z: f32,
    max_water_height: f32,
    shadow_map_active: bool,
}

impl TerrainFrame {
    /// Create a dry frame: the water level sits at the lowest terrain point,
    /// so no cell is submerged.
    pub fn new(
        geometry: MeshGeometry,
        heights: Grid<f32>,
        normals: Grid<Vec3>,
    ) -> Result<Self, TerrainError> {
        let dims = (geometry.width, geometry.height);
        check_dims("height", dims, heights.dims())?;
        check_dims("normal", dims, normals.dims())?;

        let floor = heights.min_value();
        Ok(Self {
            geometry,
            water_levels: Grid::filled(dims.0, dims.1, floor),
            water_normals: Grid::filled(dims.0, dims.1, Vec3::Z),
            water_bodies: Grid::filled(dims.0, dims.1, WaterBody::Dry),
            shadow_masks: [Grid::filled(dims.0, dims.1, 0), Grid::filled(dims.0, dims.1, 0)],
            disabled: None,
            liquid_color: Vec3::ONE,
            plane_z: floor,
            max_water_height: floor,
            shadow_map_active: false,
            heights,
            normals,
        })
    }

    /// Flood the frame with a flat water plane. Submerged cells become
    /// exterior water.
    pub fn with_flat_water(self, plane_z: f32) -> Self {
        let (w, h) = (self.geometry.width, self.geometry.height);
        let levels = Grid::filled(w, h, plane_z);
        let normals = Grid::filled(w, h, Vec3::Z);
        let bodies = Grid::from_fn(w, h, |x, y| {
            if *self.heights.get(x, y) < plane_z {
                WaterBody::Exterior
            } else {
                WaterBody::Dry
            }
        });
        Self {
            water_levels: levels,
            water_normals: normals,
            water_bodies: bodies,
            plane_z,
            max_water_height: plane_z,
            ..self
        }
    }

    /// Install an arbitrary water surface.
    pub fn with_water(
        mut self,
        plane_z: f32,
        levels: Grid<f32>,
        normals: Grid<Vec3>,
        bodies: Grid<WaterBody>,
    ) -> Result<Self, TerrainError> {
        let dims = (self.geometry.width, self.geometry.height);
        check_dims("water level", dims, levels.dims())?;
        check_dims("water normal", dims, normals.dims())?;
        check_dims("water body", dims, bodies.dims())?;

        self.max_water_height = levels.max_value().max(plane_z);
        self.plane_z = plane_z;
        self.water_levels = levels;
        self.water_normals = normals;
        self.water_bodies = bodies;
        Ok(self)
    }

    /// Replace the shadow mask of one light.
    pub fn set_shadow_mask(
        &mut self,
        light: CelestialLight,
        mask: Grid<u8>,
    ) -> Result<(), TerrainError> {
        check_dims(
            "shadow mask",
            (self.geometry.width, self.geometry.height),
            mask.dims(),
        )?;
        self.shadow_masks[light.index()] = mask;
        Ok(())
    }

    /// Mark cells that must not be drawn.
    pub fn set_disabled_cells(&mut self, disabled: Grid<bool>) -> Result<(), TerrainError> {
        check_dims(
            "disabled cell",
            (self.geometry.width, self.geometry.height),
            disabled.dims(),
        )?;
        self.disabled = Some(disabled);
        Ok(())
    }

    pub fn set_shadow_map_active(&mut self, active: bool) {
        self.shadow_map_active = active;
    }

    pub fn set_liquid_color(&mut self, color: Vec3) {
        self.liquid_color = color;
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    /// Lowest terrain elevation.
    pub fn min_height(&self) -> f32 {
        self.heights.min_value()
    }

    /// Number of submerged grid vertices.
    pub fn underwater_count(&self) -> usize {
        self.heights
            .iter()
            .zip(self.water_levels.iter())
            .filter(|(h, w)| h < w)
            .count()
    }
}

fn check_dims(
    name: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<(), TerrainError> {
    if expected != found {
        return Err(TerrainError::DimensionMismatch {
            name,
            expected,
            found,
        });
    }
    Ok(())
}

impl TerrainSource for TerrainFrame {
    fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    fn height(&self, x: usize, y: usize) -> f32 {
        *self.heights.get(x, y)
    }

    fn normal(&self, x: usize, y: usize) -> Vec3 {
        *self.normals.get(x, y)
    }

    fn is_cell_disabled(&self, x: usize, y: usize) -> bool {
        self.disabled.as_ref().is_some_and(|d| *d.get(x, y))
    }
}

impl WaterSource for TerrainFrame {
    fn level(&self, x: usize, y: usize) -> f32 {
        *self.water_levels.get(x, y)
    }

    fn surface_normal(&self, x: usize, y: usize) -> Vec3 {
        *self.water_normals.get(x, y)
    }

    fn body(&self, x: usize, y: usize) -> WaterBody {
        *self.water_bodies.get(x, y)
    }

    fn liquid_color(&self, _x: usize, _y: usize) -> Vec3 {
        self.liquid_color
    }

    fn plane_z(&self) -> f32 {
        self.plane_z
    }

    fn max_water_height(&self) -> f32 {
        self.max_water_height
    }
}

impl ShadowMapService for TerrainFrame {
    fn is_fully_shadowed(&self, light: CelestialLight, x: usize, y: usize) -> bool {
        self.shadow_masks[light.index()].get(x, y) & SHADOWED_ALL != 0
    }

    fn is_shadow_map_active(&self) -> bool {
        self.shadow_map_active
    }
}
