//! Headless shoreline lighting driver.
//!
//! Loads `config.ron`, builds a procedural island, then lights and "draws" a
//! number of frames, logging what each pass produced.
//! Run with `cargo run -p shoreline-demo -- --frames 8 --log-level debug`.

mod scene;

use clap::Parser;
use glam::Vec3;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use shoreline_config::{CliArgs, Config};
use shoreline_lighting::{
    CausticGrid, CausticsGate, CausticsProjector, ComposerSettings, FrameServices,
    GeometryEmitter, LightingComposer, SurfaceDamage, TerrainPass, TerrainVertex,
    update_caustics,
};
use shoreline_terrain::{
    CelestialLight, LightPositionService, TerrainError, TerrainSource, WaterSource,
};
use shoreline_water::{BoundarySide, BoundaryVertex, QuadEmitter, WaterBoundaryRenderer};
use tracing::{debug, error, info};

use crate::scene::{DayCycle, DriftingClouds, Flares};

/// Length of a full day in ticks.
const DAY_TICKS: f32 = 2400.0;
/// Ticks simulated per rendered frame.
const FRAME_TICKS: f32 = 40.0;

/// Counts terrain strips instead of uploading them.
#[derive(Debug, Default)]
struct StripTally {
    strips: usize,
    vertices: usize,
    brightness: f32,
}

impl GeometryEmitter for StripTally {
    fn emit_strip(&mut self, vertices: &[TerrainVertex]) {
        self.strips += 1;
        self.vertices += vertices.len();
        self.brightness += vertices
            .iter()
            .map(|v| v.color.element_sum() / 3.0 * v.normal.length())
            .sum::<f32>();
    }
}

impl StripTally {
    fn mean_brightness(&self) -> f32 {
        if self.vertices == 0 {
            0.0
        } else {
            self.brightness / self.vertices as f32
        }
    }
}

/// Counts boundary quads per side.
#[derive(Debug, Default)]
struct QuadTally {
    quads: [usize; 4],
    opacity: f32,
}

impl QuadEmitter for QuadTally {
    fn emit_quad(&mut self, side: BoundarySide, quad: &[BoundaryVertex; 4]) {
        let ix = BoundarySide::ALL
            .iter()
            .position(|s| *s == side)
            .unwrap_or_default();
        self.quads[ix] += 1;
        self.opacity += quad.iter().map(|v| v.color.w).sum::<f32>();
    }
}

fn main() {
    let args = CliArgs::parse();

    let Some(config_dir) = args
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("shoreline")))
    else {
        shoreline_log::init_logging(None, false, None);
        error!("could not resolve a configuration directory; pass --config");
        std::process::exit(1);
    };

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            shoreline_log::init_logging(None, false, None);
            error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    shoreline_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("scene setup failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), TerrainError> {
    let mut frame = scene::build_frame(config)?;
    let geometry = *frame.geometry();
    info!(
        width = geometry.width,
        height = geometry.height,
        underwater = frame.underwater_count(),
        max_water = frame.max_water_height(),
        "scene built"
    );

    let mut rng = Xoshiro256StarStar::seed_from_u64(config.terrain.seed);
    let mut cycle = DayCycle::new(DAY_TICKS);
    let mut clouds = DriftingClouds::new(
        config.terrain.seed as u32 ^ 0x5eed,
        glam::Vec2::new(0.004, 0.001),
        0.6,
    );
    let flares = Flares::scatter(&mut rng, &geometry, 3);
    debug!(flares = flares.len(), "dynamic lights placed");

    let mut damage =
        SurfaceDamage::with_max(geometry.width, geometry.height, config.lighting.max_damage);
    let projector = CausticsProjector::new(config.water.refraction_index)
        .with_parallel(config.caustics.parallel);
    let boundary = WaterBoundaryRenderer::from_config(config);
    let mut caustics = CausticGrid::new();
    let settings = ComposerSettings::from_config(config, FRAME_TICKS);

    // Standing offshore on the +X side, just below the surface.
    let camera = Vec3::new(
        1.5 * geometry.x_scene_size,
        0.2 * geometry.y_scene_size,
        frame.plane_z() - 0.1,
    );

    for index in 0..config.debug.frames {
        cycle.advance(FRAME_TICKS);
        clouds.advance(FRAME_TICKS);
        scene::scorch(&mut damage, &mut rng);

        let sun_mask = scene::shadow_mask(&frame, cycle.sun_position());
        let moon_mask = scene::shadow_mask(&frame, cycle.moon_position());
        frame.set_shadow_mask(CelestialLight::Sun, sun_mask)?;
        frame.set_shadow_mask(CelestialLight::Moon, moon_mask)?;

        let (gate, projection) =
            update_caustics(config, &frame, &cycle, &projector, &mut caustics);
        if let CausticsGate::Skip(reason) = gate {
            debug!(frame = index, ?reason, "no caustics this frame");
        }

        let services = FrameServices::new(&frame, &cycle, camera)
            .with_dynamic_lights(&flares)
            .with_clouds(&clouds);
        let mut composer = LightingComposer::new(services, &caustics, &mut damage, settings);
        let mut strips = StripTally::default();
        let pass = TerrainPass::new(&mut composer).run(&mut strips);

        let mut quads = QuadTally::default();
        let order = boundary.draw(&frame, camera, &mut quads);

        if config.debug.show_pass_stats {
            info!(
                frame = index,
                blend = cycle.blend_factor(),
                caustic_patches = projection.map_or(0, |p| p.patches),
                strips = pass.strips,
                vertices = pass.vertices,
                cache_hits = pass.cache_hits,
                suppressed = pass.suppressed_pairs,
                brightness = strips.mean_brightness(),
                boundary_quads = quads.quads.iter().sum::<usize>(),
                boundary_opacity = quads.opacity,
                first_side = ?order[0],
                "frame lit"
            );
        }
    }

    info!(damage = damage.total(), "done");
    Ok(())
}
