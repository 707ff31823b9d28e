//! Synthetic shoreline scene: procedural island, rippled sea, a day cycle,
//! drifting clouds, a few flares and random scorch marks.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};
use rand::Rng;
use shoreline_config::Config;
use shoreline_lighting::SurfaceDamage;
use shoreline_terrain::{
    CloudService, DynamicLightSample, DynamicLightService, Grid, HeightmapParams,
    HeightmapSampler, LightPositionService, MeshGeometry, TERRAIN_SHADOW, TerrainError,
    TerrainFrame, TerrainSource, WaterBody, line_intersect_mesh, surface_normals,
};

/// Distance of the sun and moon from the scene center.
const SKY_DISTANCE: f32 = 100.0;
/// Height of the cloud layer above the water plane.
const CLOUD_HEIGHT: f32 = 8.0;
const RIPPLE_AMPLITUDE: f32 = 0.02;

/// Build the frame's static grids from the terrain and water settings.
pub fn build_frame(config: &Config) -> Result<TerrainFrame, TerrainError> {
    let t = &config.terrain;
    let geometry = MeshGeometry::new(
        t.width as usize,
        t.height as usize,
        t.x_scene_size,
        t.y_scene_size,
        t.z_scene_size,
    )?
    .with_mesh_scale(t.mesh_scale);

    let sampler = HeightmapSampler::new(HeightmapParams {
        seed: t.seed,
        octaves: t.octaves,
        base_frequency: t.base_frequency,
        amplitude: t.amplitude,
        ..HeightmapParams::default()
    });
    let heights = sampler.height_grid(&geometry);
    let normals = surface_normals(&heights, &geometry);

    let plane_z = config.water.plane_z;
    let levels = Grid::from_fn(geometry.width, geometry.height, |x, y| {
        let p = geometry.point(x, y, 0.0);
        plane_z + RIPPLE_AMPLITUDE * (3.0 * p.x).sin() * (2.0 * p.y).cos()
    });
    let water_normals = surface_normals(&levels, &geometry);
    let bodies = Grid::from_fn(geometry.width, geometry.height, |x, y| {
        if heights.get(x, y) < levels.get(x, y) {
            WaterBody::Exterior
        } else {
            WaterBody::Dry
        }
    });

    let mut frame = TerrainFrame::new(geometry, heights, normals)?.with_water(
        plane_z,
        levels,
        water_normals,
        bodies,
    )?;
    frame.set_liquid_color(Vec3::from_array(config.water.liquid_color));
    Ok(frame)
}

/// Cells that cannot see `light`: set to [`TERRAIN_SHADOW`].
pub fn shadow_mask(frame: &TerrainFrame, light: Vec3) -> Grid<u8> {
    let g = *frame.geometry();
    let nudge = 0.5 * g.dx().min(g.dy());
    Grid::from_fn(g.width, g.height, |x, y| {
        let p = g.point(x, y, frame.height(x, y));
        if light.z <= p.z {
            return TERRAIN_SHADOW;
        }
        let dir = (light - p).normalize();
        let start = p + dir * nudge + Vec3::Z * 1e-3;
        let end = start + dir * g.ray_length();
        if line_intersect_mesh(frame, start, end).is_some() {
            TERRAIN_SHADOW
        } else {
            0
        }
    })
}

/// Sun and moon on opposite sides of a tilted circular orbit.
#[derive(Clone, Debug)]
pub struct DayCycle {
    ticks: f32,
    day_length: f32,
}

impl DayCycle {
    /// Start mid-morning so the first frames are lit by the sun.
    pub fn new(day_length: f32) -> Self {
        Self {
            ticks: 0.15 * day_length,
            day_length,
        }
    }

    pub fn advance(&mut self, ticks: f32) {
        self.ticks = (self.ticks + ticks) % self.day_length;
    }

    fn sun_direction(&self) -> Vec3 {
        let angle = TAU * self.ticks / self.day_length;
        Vec3::new(angle.cos(), 0.3, angle.sin()).normalize()
    }
}

impl LightPositionService for DayCycle {
    fn sun_position(&self) -> Vec3 {
        self.sun_direction() * SKY_DISTANCE
    }

    fn moon_position(&self) -> Vec3 {
        -self.sun_direction() * SKY_DISTANCE
    }

    fn blend_factor(&self) -> f32 {
        (0.5 + self.sun_direction().z).clamp(0.0, 1.0)
    }
}

/// Perlin cloud layer drifting with the wind.
pub struct DriftingClouds {
    noise: Perlin,
    offset: Vec2,
    wind: Vec2,
    coverage: f32,
}

impl DriftingClouds {
    pub fn new(seed: u32, wind: Vec2, coverage: f32) -> Self {
        Self {
            noise: Perlin::new(seed),
            offset: Vec2::ZERO,
            wind,
            coverage,
        }
    }

    pub fn advance(&mut self, ticks: f32) {
        self.offset += self.wind * ticks;
    }
}

impl CloudService for DriftingClouds {
    fn density(&self, position: Vec3, direction_to_light: Vec3) -> f32 {
        if direction_to_light.z <= 0.0 {
            return 0.0;
        }
        let t = (CLOUD_HEIGHT - position.z) / direction_to_light.z;
        let at = (position + direction_to_light * t).truncate() * 0.2 + self.offset;
        let n = self.noise.get([f64::from(at.x), f64::from(at.y)]) as f32;
        (0.5 * (n + 1.0) * self.coverage).clamp(0.0, 1.0)
    }
}

/// Point light with linear falloff.
#[derive(Clone, Copy, Debug)]
pub struct Flare {
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
}

/// A handful of flares scattered over the scene.
#[derive(Clone, Debug, Default)]
pub struct Flares {
    lights: Vec<Flare>,
}

impl Flares {
    pub fn scatter(rng: &mut impl Rng, geometry: &MeshGeometry, count: usize) -> Self {
        let half = geometry.half_extents();
        let lights = (0..count)
            .map(|_| Flare {
                position: Vec3::new(
                    rng.gen_range(-half.x..half.x),
                    rng.gen_range(-half.y..half.y),
                    rng.gen_range(0.5..1.5),
                ),
                color: Vec3::new(1.0, rng.gen_range(0.4..0.8), 0.1) * 0.05,
                radius: rng.gen_range(0.5..1.5),
            })
            .collect();
        Self { lights }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

impl DynamicLightService for Flares {
    fn has_sources(&self) -> bool {
        !self.lights.is_empty()
    }

    fn sample(&self, position: Vec3, normal: Vec3) -> DynamicLightSample {
        let color = self
            .lights
            .iter()
            .map(|light| {
                let to_light = light.position - position;
                let falloff = (1.0 - to_light.length() / light.radius).max(0.0);
                let facing = normal.dot(to_light.normalize_or_zero()).max(0.0);
                light.color * falloff * facing
            })
            .sum();
        DynamicLightSample {
            color,
            normal_scale: 1.0,
        }
    }
}

/// Burn a random vertex.
pub fn scorch(damage: &mut SurfaceDamage, rng: &mut impl Rng) {
    let (w, h) = damage.dims();
    let amount = rng.gen_range(0.2..1.0);
    damage.damage(rng.gen_range(0..w), rng.gen_range(0..h), amount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use shoreline_terrain::WaterSource;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.terrain.width = 16;
        config.terrain.height = 16;
        config
    }

    #[test]
    fn test_build_frame_matches_config() {
        let frame = build_frame(&small_config()).unwrap();
        assert_eq!(frame.geometry().dims(), [16, 16]);
        assert!(frame.max_water_height() >= 0.0);
    }

    #[test]
    fn test_build_frame_rejects_tiny_grid() {
        let mut config = small_config();
        config.terrain.width = 1;
        assert!(matches!(
            build_frame(&config),
            Err(TerrainError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_flat_terrain_unshadowed_at_noon() {
        let g = MeshGeometry::new(8, 8, 2.0, 2.0, 2.0).unwrap();
        let frame =
            TerrainFrame::new(g, Grid::filled(8, 8, 0.0), Grid::filled(8, 8, Vec3::Z)).unwrap();
        let mask = shadow_mask(&frame, Vec3::new(0.0, 0.0, 50.0));
        assert!(mask.iter().all(|&m| m == 0));
        let night = shadow_mask(&frame, Vec3::new(0.0, 0.0, -50.0));
        assert!(night.iter().all(|&m| m == TERRAIN_SHADOW));
    }

    #[test]
    fn test_wall_casts_shadow() {
        let g = MeshGeometry::new(8, 8, 4.0, 4.0, 4.0).unwrap();
        let heights = Grid::from_fn(8, 8, |x, _| if x == 5 { 3.0 } else { 0.0 });
        let frame = TerrainFrame::new(g, heights, Grid::filled(8, 8, Vec3::Z)).unwrap();
        // Low sun far along +X: the wall at column 5 hides columns 0..5.
        let mask = shadow_mask(&frame, Vec3::new(100.0, 0.0, 10.0));
        assert_eq!(*mask.get(3, 4), TERRAIN_SHADOW);
        assert_eq!(*mask.get(6, 4), 0);
    }

    #[test]
    fn test_day_cycle_blend_in_range() {
        let mut cycle = DayCycle::new(100.0);
        for _ in 0..40 {
            cycle.advance(3.0);
            let b = cycle.blend_factor();
            assert!((0.0..=1.0).contains(&b));
        }
        assert!((cycle.sun_position() + cycle.moon_position()).length() < 1e-4);
    }

    #[test]
    fn test_flares_light_nearby_ground() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let g = MeshGeometry::new(8, 8, 2.0, 2.0, 2.0).unwrap();
        let flares = Flares::scatter(&mut rng, &g, 3);
        assert_eq!(flares.len(), 3);
        assert!(flares.has_sources());
        let near = flares.lights[0].position - Vec3::Z * 0.25;
        assert!(flares.sample(near, Vec3::Z).color.length() > 0.0);
    }

    #[test]
    fn test_scorch_marks_one_vertex() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut damage = SurfaceDamage::new(4, 4);
        scorch(&mut damage, &mut rng);
        assert!(damage.total() > 0.0);
    }
}
