//! Per-frame decision whether underwater caustics are projected.

use shoreline_config::Config;
use shoreline_terrain::{LightPositionService, TerrainFrame, WaterSource};

use crate::{CausticGrid, CausticsProjector, ProjectionStats};

/// Why caustics were not projected this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The display mode has underwater lighting switched off.
    DisabledByMode,
    WaterDisabled,
    /// Open ocean scenes have no bounded seabed to light.
    OpenOcean,
    /// Ground effects level 0.
    GroundEffectsOff,
    /// No terrain lies below the highest water surface.
    AboveWater,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CausticsGate {
    Run,
    Skip(SkipReason),
}

impl CausticsGate {
    pub fn evaluate(config: &Config, min_terrain: f32, max_water_height: f32) -> Self {
        let reason = if !config.caustics.enabled {
            SkipReason::DisabledByMode
        } else if !config.water.enabled {
            SkipReason::WaterDisabled
        } else if config.water.open_ocean {
            SkipReason::OpenOcean
        } else if config.lighting.ground_effects_level == 0 {
            SkipReason::GroundEffectsOff
        } else if min_terrain >= max_water_height {
            SkipReason::AboveWater
        } else {
            return Self::Run;
        };
        Self::Skip(reason)
    }

    pub fn should_run(self) -> bool {
        self == Self::Run
    }
}

/// Rebuild `grid` for this frame, or clear it when the gate says skip.
///
/// Light is traced from the dominant celestial body.
pub fn update_caustics(
    config: &Config,
    frame: &TerrainFrame,
    lights: &dyn LightPositionService,
    projector: &CausticsProjector,
    grid: &mut CausticGrid,
) -> (CausticsGate, Option<ProjectionStats>) {
    let gate = CausticsGate::evaluate(config, frame.min_height(), frame.max_water_height());
    match gate {
        CausticsGate::Run => {
            let stats = projector.project(frame, lights.dominant_position(), grid);
            (gate, Some(stats))
        }
        CausticsGate::Skip(reason) => {
            tracing::debug!(?reason, "caustics skipped");
            grid.clear();
            (gate, None)
        }
    }
}
