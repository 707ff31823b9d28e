//! Per-vertex terrain lighting.
//!
//! [`LightingComposer`] turns one terrain vertex into an output `(normal,
//! color)` pair. The color carries diffuse intensity, damage, dynamic lights,
//! water absorption and liquid tint. The normal length carries the light
//! scale (shadows, caustics, cloud cover) so the fixed-function diffuse term
//! picks it up.
//!
//! Vertices are produced two at a time by [`LightingComposer::draw_pair`] for
//! triangle strips, so every interior row is visited twice: once as the lower
//! edge of a strip and once as the upper edge of the previous one. A
//! per-column cache of the last composed row serves the second visit.

use glam::Vec3;
use shoreline_config::Config;
use shoreline_terrain::{
    CelestialLight, ClearSky, CloudService, DynamicLightService, LightPositionService,
    MeshGeometry, NoDynamicLights, ShadowMapService, TerrainFrame, TerrainSource, WaterBody,
    WaterSource,
};

use crate::{
    CausticGrid, SurfaceDamage, WaterAttenuation, celestial_light_scale, cloud_shadow_attenuation,
    integrate_water_dist,
};

/// One vertex of a terrain triangle strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainVertex {
    pub position: Vec3,
    /// Vertex normal scaled by the light reaching it.
    pub normal: Vec3,
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct RowCacheEntry {
    normal: Vec3,
    color: Vec3,
    /// Source row the entry was composed for.
    row: Option<usize>,
}

impl RowCacheEntry {
    const EMPTY: Self = Self {
        normal: Vec3::ZERO,
        color: Vec3::ZERO,
        row: None,
    };
}

/// Tunables for one terrain pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposerSettings {
    pub diffuse: f32,
    /// Damage healed per composed vertex this frame.
    pub heal_amount: f32,
    pub dynamic_light_scale: f32,
    pub dynamic_lights: bool,
    pub ground_effects_level: u8,
    pub has_snow: bool,
    pub combined_universe: bool,
    /// Shadows come from a shadow-map shader when one is active.
    pub shadow_map_shader: bool,
    /// Smallest normal length written for any vertex.
    pub normal_floor: f32,
    pub cloud_opacity_steepness: f32,
    pub water_enabled: bool,
    /// Distance multiplier for exterior water.
    pub color_attenuation: f32,
    /// Extra distance multiplier for any other water body.
    pub interior_scale: f32,
    /// Power the caustic ratio is raised to.
    pub caustic_sharpness: i32,
    pub attenuation: WaterAttenuation,
    /// Vertex pairs lying entirely below this height are skipped.
    pub z_cutoff: Option<f32>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), 1.0)
    }
}

impl ComposerSettings {
    /// Settings for a frame `elapsed_ticks` after the previous one.
    pub fn from_config(config: &Config, elapsed_ticks: f32) -> Self {
        let lighting = &config.lighting;
        let water = &config.water;
        Self {
            diffuse: lighting.diffuse,
            heal_amount: lighting.heal_rate * elapsed_ticks,
            dynamic_light_scale: lighting.dynamic_light_scale,
            dynamic_lights: lighting.dynamic_lights,
            ground_effects_level: lighting.ground_effects_level,
            has_snow: lighting.has_snow,
            combined_universe: lighting.combined_universe,
            shadow_map_shader: lighting.shadow_map_shader,
            normal_floor: lighting.normal_floor,
            cloud_opacity_steepness: lighting.cloud_opacity_steepness,
            water_enabled: water.enabled,
            color_attenuation: water.color_attenuation,
            interior_scale: water.interior_scale,
            caustic_sharpness: config.caustics.sharpness,
            attenuation: WaterAttenuation::new(Vec3::from_array(water.absorption)),
            z_cutoff: config.terrain.z_cutoff,
        }
    }
}

/// Read-only collaborators for one frame.
#[derive(Clone, Copy)]
pub struct FrameServices<'a> {
    pub terrain: &'a dyn TerrainSource,
    pub water: &'a dyn WaterSource,
    pub shadows: &'a dyn ShadowMapService,
    pub dynamic_lights: &'a dyn DynamicLightService,
    pub clouds: &'a dyn CloudService,
    pub lights: &'a dyn LightPositionService,
    /// Viewer position, for the view leg of underwater paths.
    pub camera: Vec3,
}

impl<'a> FrameServices<'a> {
    /// Services backed by a frame, with no dynamic lights and a clear sky.
    pub fn new(frame: &'a TerrainFrame, lights: &'a dyn LightPositionService, camera: Vec3) -> Self {
        Self {
            terrain: frame,
            water: frame,
            shadows: frame,
            dynamic_lights: &NoDynamicLights,
            clouds: &ClearSky,
            lights,
            camera,
        }
    }

    pub fn with_dynamic_lights(mut self, dynamic_lights: &'a dyn DynamicLightService) -> Self {
        self.dynamic_lights = dynamic_lights;
        self
    }

    pub fn with_clouds(mut self, clouds: &'a dyn CloudService) -> Self {
        self.clouds = clouds;
        self
    }
}

/// Composes lit terrain vertices and collects them into the current strip.
pub struct LightingComposer<'a> {
    services: FrameServices<'a>,
    caustics: &'a CausticGrid,
    damage: &'a mut SurfaceDamage,
    settings: ComposerSettings,
    row_cache: Vec<RowCacheEntry>,
    strip: Vec<TerrainVertex>,
    computed: usize,
    cache_hits: usize,
}

impl<'a> LightingComposer<'a> {
    /// # Panics
    ///
    /// Panics if the damage or caustic grid does not match the terrain.
    pub fn new(
        services: FrameServices<'a>,
        caustics: &'a CausticGrid,
        damage: &'a mut SurfaceDamage,
        settings: ComposerSettings,
    ) -> Self {
        let geometry = *services.terrain.geometry();
        let dims = (geometry.width, geometry.height);
        assert_eq!(damage.dims(), dims, "surface damage grid does not match terrain");
        if let Some(cells) = caustics.cells() {
            assert_eq!(cells.dims(), dims, "caustic grid does not match terrain");
        }
        Self {
            services,
            caustics,
            damage,
            settings,
            row_cache: vec![RowCacheEntry::EMPTY; geometry.width],
            strip: Vec::with_capacity(2 * geometry.width),
            computed: 0,
            cache_hits: 0,
        }
    }

    pub fn geometry(&self) -> &MeshGeometry {
        self.services.terrain.geometry()
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Forget cached rows and counters before a new terrain pass.
    pub fn reset_pass(&mut self) {
        self.row_cache.fill(RowCacheEntry::EMPTY);
        self.strip.clear();
        self.computed = 0;
        self.cache_hits = 0;
    }

    /// Lit `(normal, color)` for the vertex at column `x`, row `y`, placed at
    /// `position`.
    pub fn compose(&mut self, x: usize, y: usize, position: Vec3) -> (Vec3, Vec3) {
        let FrameServices {
            terrain,
            water,
            shadows,
            dynamic_lights,
            clouds,
            lights,
            camera,
        } = self.services;
        let s = self.settings;
        self.computed += 1;

        let damage = self.damage.heal(x, y, s.heal_amount);
        let mut color = Vec3::splat(s.diffuse * (1.0 - damage).max(0.0));
        let mut normal_scale = 1.0;

        if s.dynamic_lights && s.dynamic_light_scale > 0.0 && dynamic_lights.has_sources() {
            let sample = dynamic_lights.sample(position, terrain.normal(x, y));
            color += s.dynamic_light_scale * sample.color;
            normal_scale *= sample.normal_scale;
        }

        let mut light_scale = 1.0;
        if !(s.shadow_map_shader && shadows.is_shadow_map_active()) {
            let blend = lights.blend_factor();
            let sun_lit = !shadows.is_fully_shadowed(CelestialLight::Sun, x, y);
            let moon_lit = !shadows.is_fully_shadowed(CelestialLight::Moon, x, y);
            light_scale = celestial_light_scale(blend, sun_lit, moon_lit);
        }

        let geometry = terrain.geometry();
        let ground = geometry.point(x, y, terrain.height(x, y));
        let level = water.level(x, y);
        if s.water_enabled && position.z < water.max_water_height() && position.z < level {
            let body = water.body(x, y);
            let body_scale = match body {
                WaterBody::Exterior => 1.0,
                WaterBody::Interior | WaterBody::Dry => s.interior_scale,
            };
            let view = integrate_water_dist(water, geometry, ground, camera, level);
            let light = integrate_water_dist(water, geometry, ground, lights.dominant_position(), level);
            color = s
                .attenuation
                .attenuate(s.color_attenuation * body_scale * (view + light))
                .apply(color);
            if body == WaterBody::Interior {
                color *= water.liquid_color(x, y);
            }
            if light_scale > 0.0 && !self.caustics.is_empty() {
                light_scale *= self.caustics.ratio(x, y).powi(s.caustic_sharpness);
            }
        }

        if s.ground_effects_level >= 2 && !s.has_snow && light_scale > 0.0 {
            light_scale *= cloud_shadow_attenuation(
                ground,
                lights,
                clouds,
                !s.combined_universe,
                s.cloud_opacity_steepness,
            );
        }

        let normal = terrain.normal(x, y) * (light_scale * normal_scale).max(s.normal_floor);
        (normal, color)
    }

    /// Append the vertices of column `col` on rows `row` and `row + 1`
    /// (clamped) to the current strip, with the lower one at world `(x, y)`.
    ///
    /// Once the strip holds a triangle's worth of vertices, a pair touching a
    /// disabled cell or lying wholly below the height cutoff is refused:
    /// nothing is appended and `false` is returned so the caller can flush.
    pub fn draw_pair(&mut self, row: usize, col: usize, x: f32, y: f32) -> bool {
        let terrain = self.services.terrain;
        let geometry = *terrain.geometry();
        let next = (row + 1).min(geometry.height - 1);

        if self.strip.len() > 1 {
            if terrain.is_cell_disabled(col, row) || terrain.is_cell_disabled(col, next) {
                return false;
            }
            let top = terrain.height(col, row).max(terrain.height(col, next));
            if self.settings.z_cutoff.is_some_and(|cutoff| cutoff > top) {
                return false;
            }
        }

        for p in 0..2 {
            let source_row = (row + p).min(geometry.height - 1);
            let position = Vec3::new(
                x,
                y + p as f32 * geometry.dy(),
                terrain.height(col, source_row),
            );
            let cached = self.row_cache[col];
            let (normal, color) = if cached.row == Some(source_row) {
                self.cache_hits += 1;
                (cached.normal, cached.color)
            } else {
                let (normal, color) = self.compose(col, source_row, position);
                self.row_cache[col] = RowCacheEntry {
                    normal,
                    color,
                    row: Some(source_row),
                };
                (normal, color)
            };
            self.strip.push(TerrainVertex {
                position,
                normal,
                color,
            });
        }
        true
    }

    /// Vertices appended since the last flush.
    pub fn strip(&self) -> &[TerrainVertex] {
        &self.strip
    }

    pub fn strip_len(&self) -> usize {
        self.strip.len()
    }

    pub fn clear_strip(&mut self) {
        self.strip.clear();
    }

    /// Vertices served from the row cache since the last reset.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Vertices composed from scratch since the last reset.
    pub fn computed(&self) -> usize {
        self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoreline_terrain::{DynamicLightSample, Grid};

    struct Sky {
        blend: f32,
    }

    impl LightPositionService for Sky {
        fn sun_position(&self) -> Vec3 {
            Vec3::new(0.0, 0.0, 50.0)
        }

        fn moon_position(&self) -> Vec3 {
            Vec3::new(10.0, 0.0, 40.0)
        }

        fn blend_factor(&self) -> f32 {
            self.blend
        }
    }

    struct Torch;

    impl DynamicLightService for Torch {
        fn has_sources(&self) -> bool {
            true
        }

        fn sample(&self, _position: Vec3, _normal: Vec3) -> DynamicLightSample {
            DynamicLightSample {
                color: Vec3::new(0.1, 0.05, 0.0),
                normal_scale: 2.0,
            }
        }
    }

    /// Dynamic light that contributes no color and suppresses the diffuse term.
    struct Dimmer;

    impl DynamicLightService for Dimmer {
        fn has_sources(&self) -> bool {
            true
        }

        fn sample(&self, _position: Vec3, _normal: Vec3) -> DynamicLightSample {
            DynamicLightSample {
                color: Vec3::ZERO,
                normal_scale: 0.0,
            }
        }
    }

    struct Overcast(f32);

    impl CloudService for Overcast {
        fn density(&self, _position: Vec3, _direction_to_light: Vec3) -> f32 {
            self.0
        }
    }

    /// 4x4 grid sloping from -1 at column 0 up to 0.5 at column 3, flooded to 0.
    fn shore() -> TerrainFrame {
        let g = MeshGeometry::new(4, 4, 2.0, 2.0, 2.0).unwrap();
        let heights = Grid::from_fn(4, 4, |x, _| -1.0 + 0.5 * x as f32);
        TerrainFrame::new(g, heights, Grid::filled(4, 4, Vec3::Z))
            .unwrap()
            .with_flat_water(0.0)
    }

    fn settings() -> ComposerSettings {
        ComposerSettings {
            heal_amount: 0.0,
            ground_effects_level: 1,
            ..ComposerSettings::default()
        }
    }

    fn ground(frame: &TerrainFrame, x: usize, y: usize) -> Vec3 {
        frame.geometry().point(x, y, frame.height(x, y))
    }

    #[test]
    fn test_dry_lit_vertex_is_plain_diffuse() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::new(0.0, -10.0, 5.0)),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, color) = composer.compose(3, 1, ground(&frame, 3, 1));
        assert_eq!(color, Vec3::splat(0.8));
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_zero_depth_vertex_not_attenuated() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::new(0.0, -10.0, 5.0)),
            &caustics,
            &mut damage,
            settings(),
        );
        // Column 2 sits exactly at the water level.
        assert_eq!(frame.height(2, 0), 0.0);
        let (_, color) = composer.compose(2, 0, ground(&frame, 2, 0));
        assert_eq!(color, Vec3::splat(0.8));
    }

    #[test]
    fn test_damage_darkens_and_heals() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        damage.damage(3, 3, 0.5);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            ComposerSettings {
                heal_amount: 0.25,
                ..settings()
            },
        );
        let (_, color) = composer.compose(3, 3, ground(&frame, 3, 3));
        assert!((color.x - 0.8 * 0.75).abs() < 1e-6);
        drop(composer);
        assert_eq!(damage.get(3, 3), 0.25);
    }

    #[test]
    fn test_shadowed_vertex_keeps_floor_normal() {
        let mut frame = shore();
        let mut mask = Grid::filled(4, 4, 0_u8);
        mask.set(3, 2, shoreline_terrain::TERRAIN_SHADOW);
        frame.set_shadow_mask(CelestialLight::Sun, mask).unwrap();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, _) = composer.compose(3, 2, ground(&frame, 3, 2));
        assert!((normal.length() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_shadow_map_shader_skips_masks() {
        let mut frame = shore();
        frame
            .set_shadow_mask(CelestialLight::Sun, Grid::filled(4, 4, shoreline_terrain::SHADOWED_ALL))
            .unwrap();
        frame.set_shadow_map_active(true);
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            ComposerSettings {
                shadow_map_shader: true,
                ..settings()
            },
        );
        let (normal, _) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_twilight_blends_shadows() {
        let mut frame = shore();
        frame
            .set_shadow_mask(CelestialLight::Sun, Grid::filled(4, 4, shoreline_terrain::OBJECT_SHADOW))
            .unwrap();
        let sky = Sky { blend: 0.5 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, _) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert!((normal.length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_underwater_vertex_absorbs_red_first() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::new(-1.0, 0.0, 5.0)),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, color) = composer.compose(0, 2, ground(&frame, 0, 2));
        assert!(color.x < color.y && color.y < color.z);
        assert!(color.z < 0.8);
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_interior_water_tinted_and_darker() {
        let lake = |body: WaterBody| {
            let g = MeshGeometry::new(4, 4, 2.0, 2.0, 2.0).unwrap();
            let mut frame =
                TerrainFrame::new(g, Grid::filled(4, 4, -1.0), Grid::filled(4, 4, Vec3::Z))
                    .unwrap()
                    .with_water(
                        0.0,
                        Grid::filled(4, 4, 0.0),
                        Grid::filled(4, 4, Vec3::Z),
                        Grid::filled(4, 4, body),
                    )
                    .unwrap();
            frame.set_liquid_color(Vec3::new(0.5, 1.0, 1.0));
            frame
        };
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let color_of = |frame: &TerrainFrame| {
            let mut damage = SurfaceDamage::new(4, 4);
            let mut composer = LightingComposer::new(
                FrameServices::new(frame, &sky, Vec3::new(0.0, 0.0, 5.0)),
                &caustics,
                &mut damage,
                settings(),
            );
            composer.compose(1, 1, ground(frame, 1, 1)).1
        };
        let exterior = color_of(&lake(WaterBody::Exterior));
        let interior = color_of(&lake(WaterBody::Interior));
        assert!(exterior.x < 0.8);
        assert!(interior.x < 0.5 * exterior.x);
        assert!(interior.y < exterior.y);
    }

    #[test]
    fn test_caustic_ratio_sharpened() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let mut caustics = CausticGrid::new();
        let cells = caustics.reset(4, 4);
        cells.set(
            0,
            1,
            crate::CausticRatio {
                numerator: 2.0,
                denominator: 1.0,
            },
        );
        // A dry cell must ignore its ratio.
        cells.set(
            3,
            1,
            crate::CausticRatio {
                numerator: 3.0,
                denominator: 1.0,
            },
        );
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
        let (wet, _) = composer.compose(0, 1, ground(&frame, 0, 1));
        assert!((wet.length() - 256.0).abs() < 1e-3);
        let (dry, _) = composer.compose(3, 1, ground(&frame, 3, 1));
        assert_eq!(dry, Vec3::Z);
    }

    #[test]
    fn test_dynamic_light_adds_color() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO).with_dynamic_lights(&Torch),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, color) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert!((color - Vec3::new(1.2, 1.0, 0.8)).abs().max_element() < 1e-6);
        assert_eq!(normal, Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_row_cache_reuses_identical_vertex() {
        let frame = shore();
        let sky = Sky { blend: 0.55 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::new(1.0, -3.0, 4.0)),
            &caustics,
            &mut damage,
            ComposerSettings {
                ground_effects_level: 2,
                ..settings()
            },
        );
        let g = *frame.geometry();

        assert!(composer.draw_pair(0, 1, g.xval(1), g.yval(0)));
        let upper = composer.strip()[1];
        composer.clear_strip();
        assert!(composer.draw_pair(1, 1, g.xval(1), g.yval(1)));
        let reused = composer.strip()[0];
        assert_eq!(composer.cache_hits(), 1);
        assert_eq!(composer.computed(), 3);
        assert_eq!(reused.normal.to_array(), upper.normal.to_array());
        assert_eq!(reused.color.to_array(), upper.color.to_array());

        let (normal, color) = composer.compose(1, 1, upper.position);
        assert_eq!(normal.to_array(), upper.normal.to_array());
        assert_eq!(color.to_array(), upper.color.to_array());
    }

    #[test]
    fn test_last_row_pair_clamps() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
        assert!(composer.draw_pair(3, 0, -2.0, 1.0));
        assert_eq!(composer.computed(), 1);
        assert_eq!(composer.cache_hits(), 1);
    }

    #[test]
    fn test_disabled_cell_refused_after_first_triangle() {
        let mut frame = shore();
        frame
            .set_disabled_cells(Grid::from_fn(4, 4, |x, _| x == 2))
            .unwrap();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
        // An empty strip always accepts the first pair.
        assert!(composer.draw_pair(0, 2, 0.0, -2.0));
        composer.clear_strip();
        assert!(composer.draw_pair(0, 1, -1.0, -2.0));
        assert!(!composer.draw_pair(0, 2, 0.0, -2.0));
        assert_eq!(composer.strip_len(), 2);
    }

    #[test]
    fn test_z_cutoff_refuses_low_pairs() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            ComposerSettings {
                z_cutoff: Some(-0.25),
                ..settings()
            },
        );
        assert!(composer.draw_pair(0, 3, 1.0, -2.0));
        assert!(composer.draw_pair(0, 2, 0.0, -2.0));
        assert!(!composer.draw_pair(0, 1, -1.0, -2.0));
        assert_eq!(composer.strip_len(), 4);
    }

    #[test]
    #[should_panic(expected = "surface damage grid does not match terrain")]
    fn test_mismatched_damage_panics() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(3, 4);
        LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO),
            &caustics,
            &mut damage,
            settings(),
        );
    }

    #[test]
    fn test_normal_floor_holds_under_zero_dynamic_scale() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO).with_dynamic_lights(&Dimmer),
            &caustics,
            &mut damage,
            settings(),
        );
        let (normal, _) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert!((normal.length() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_clouds_darken_normal() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let clouds = Overcast(0.25);
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO).with_clouds(&clouds),
            &caustics,
            &mut damage,
            ComposerSettings {
                ground_effects_level: 2,
                ..settings()
            },
        );
        let (normal, color) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert!((normal.z - (1.0 - 1.7 * 0.25)).abs() < 1e-6);
        assert_eq!(color, Vec3::splat(0.8));
    }

    #[test]
    fn test_snow_disables_cloud_shadow() {
        let frame = shore();
        let sky = Sky { blend: 1.0 };
        let clouds = Overcast(1.0);
        let caustics = CausticGrid::new();
        let mut damage = SurfaceDamage::new(4, 4);
        let mut composer = LightingComposer::new(
            FrameServices::new(&frame, &sky, Vec3::ZERO).with_clouds(&clouds),
            &caustics,
            &mut damage,
            ComposerSettings {
                ground_effects_level: 2,
                has_snow: true,
                ..settings()
            },
        );
        let (normal, _) = composer.compose(3, 0, ground(&frame, 3, 0));
        assert_eq!(normal, Vec3::Z);
    }
}
