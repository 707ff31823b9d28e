//! Distance-based light absorption in water.

use glam::Vec3;

/// Multiplicative color scale and opacity for a path through water.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Falloff {
    /// Per-channel transmittance in `(0, 1]`.
    pub color_scale: Vec3,
    /// Opacity in `[0, 1]`, rising with distance.
    pub alpha: f32,
}

impl Falloff {
    /// Darken `color` by this falloff.
    pub fn apply(&self, color: Vec3) -> Vec3 {
        color * self.color_scale
    }
}

/// Beer-Lambert style absorption with a fixed coefficient per RGB channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterAttenuation {
    /// Absorption coefficients; red is absorbed fastest in real water.
    pub absorption: Vec3,
}

impl Default for WaterAttenuation {
    fn default() -> Self {
        Self {
            absorption: Vec3::new(1.2, 0.45, 0.2),
        }
    }
}

impl WaterAttenuation {
    pub fn new(absorption: Vec3) -> Self {
        Self { absorption }
    }

    /// Falloff after traveling `distance` through water. Negative distances
    /// count as zero.
    pub fn attenuate(&self, distance: f32) -> Falloff {
        let d = distance.max(0.0);
        Falloff {
            color_scale: Vec3::new(
                (-self.absorption.x * d).exp(),
                (-self.absorption.y * d).exp(),
                (-self.absorption.z * d).exp(),
            ),
            alpha: d.clamp(0.0, 1.0),
        }
    }
}
