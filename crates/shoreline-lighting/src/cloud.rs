//! Cloud shadows on the ground.

use glam::Vec3;
use shoreline_terrain::{CloudService, LightPositionService};

use crate::celestial::{MOON_THRESHOLD, SUN_THRESHOLD};

/// Fraction of sun and moon light that makes it through the clouds to `pos`.
///
/// Each light is weighted by how far the blend factor sits past its
/// threshold (saturating five times faster than the band), so the result
/// runs from 0 under opaque cloud to 1 under a clear sky. The moon term is
/// left out when `include_moon` is false.
pub fn cloud_shadow_attenuation(
    pos: Vec3,
    lights: &dyn LightPositionService,
    clouds: &dyn CloudService,
    include_moon: bool,
    steepness: f32,
) -> f32 {
    let blend = lights.blend_factor();
    let transmit = |light: Vec3| {
        let dir = (light - pos).normalize_or_zero();
        1.0 - (steepness * clouds.density(pos, dir)).clamp(0.0, 1.0)
    };

    let mut scale = 0.0;
    if blend > MOON_THRESHOLD {
        scale += (5.0 * (blend - MOON_THRESHOLD)).min(1.0) * transmit(lights.sun_position());
    }
    if blend < SUN_THRESHOLD && include_moon {
        scale += (-5.0 * (blend - SUN_THRESHOLD)).min(1.0) * transmit(lights.moon_position());
    }
    scale
}
