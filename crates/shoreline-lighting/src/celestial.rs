//! Sun/moon shadow blending over the day-night blend factor.
//!
//! The blend factor runs from 0 (moon only) to 1 (sun only). Above
//! [`SUN_THRESHOLD`] only the sun casts shadows, below [`MOON_THRESHOLD`] only
//! the moon; between them both contribute.

/// Blend factor at and above which only sun shadows apply.
pub const SUN_THRESHOLD: f32 = 0.6;
/// Blend factor at and below which only moon shadows apply.
pub const MOON_THRESHOLD: f32 = 0.4;

/// Which lights shade a vertex for a given blend factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowRegime {
    Sun,
    Moon,
    Twilight,
}

impl ShadowRegime {
    pub fn classify(blend: f32) -> Self {
        if blend >= SUN_THRESHOLD {
            Self::Sun
        } else if blend <= MOON_THRESHOLD {
            Self::Moon
        } else {
            Self::Twilight
        }
    }

}

/// Light reaching a vertex in the twilight band.
///
/// Both lit gives 1, neither gives 0. With one light blocked, the remaining
/// light's share ramps linearly across the band.
pub fn blend_light(blend: f32, sun_lit: bool, moon_lit: bool) -> f32 {
    let sun_weight =
        ((blend - MOON_THRESHOLD) / (SUN_THRESHOLD - MOON_THRESHOLD)).clamp(0.0, 1.0);
    match (sun_lit, moon_lit) {
        (true, true) => 1.0,
        (false, false) => 0.0,
        (true, false) => sun_weight,
        (false, true) => 1.0 - sun_weight,
    }
}

/// Shadow term for a vertex: 1 when lit, 0 when shadowed, blended in twilight.
pub fn celestial_light_scale(blend: f32, sun_lit: bool, moon_lit: bool) -> f32 {
    match ShadowRegime::classify(blend) {
        ShadowRegime::Sun => f32::from(u8::from(sun_lit)),
        ShadowRegime::Moon => f32::from(u8::from(moon_lit)),
        ShadowRegime::Twilight => blend_light(blend, sun_lit, moon_lit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(ShadowRegime::classify(1.0), ShadowRegime::Sun);
        assert_eq!(ShadowRegime::classify(0.6), ShadowRegime::Sun);
        assert_eq!(ShadowRegime::classify(0.5), ShadowRegime::Twilight);
        assert_eq!(ShadowRegime::classify(0.4), ShadowRegime::Moon);
        assert_eq!(ShadowRegime::classify(0.0), ShadowRegime::Moon);
    }

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend_light(0.5, true, true), 1.0);
        assert_eq!(blend_light(0.5, false, false), 0.0);
    }

    #[test]
    fn test_blend_ramps_linearly() {
        assert!((blend_light(0.5, true, false) - 0.5).abs() < 1e-6);
        assert!((blend_light(0.45, true, false) - 0.25).abs() < 1e-6);
        assert!((blend_light(0.45, false, true) - 0.75).abs() < 1e-6);
        assert_eq!(blend_light(0.7, true, false), 1.0);
    }

    #[test]
    fn test_light_scale_per_regime() {
        assert_eq!(celestial_light_scale(0.9, false, true), 0.0);
        assert_eq!(celestial_light_scale(0.9, true, false), 1.0);
        assert_eq!(celestial_light_scale(0.1, true, false), 0.0);
        assert_eq!(celestial_light_scale(0.1, false, true), 1.0);
        assert!((celestial_light_scale(0.55, true, false) - 0.75).abs() < 1e-6);
    }
}
