//! Snell's law refraction.

use glam::Vec3;

/// Index of refraction of water relative to air.
pub const WATER_REFRACTION_INDEX: f32 = 1.333;

/// Refract `incident` crossing a surface with normal `normal` from a medium
/// of index `n1` into one of index `n2`.
///
/// The normal may face either side of the surface. Returns the unit
/// refracted direction, or `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, n1: f32, n2: f32) -> Option<Vec3> {
    let i = incident.normalize();
    let mut n = normal.normalize();
    let mut cos_i = -n.dot(i);
    if cos_i < 0.0 {
        n = -n;
        cos_i = -cos_i;
    }
    let eta = n1 / n2;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some((eta * i + (eta * cos_i - k.sqrt()) * n).normalize())
}
