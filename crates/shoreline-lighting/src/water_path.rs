//! Path length of a light or view ray through the water above a point.

use glam::Vec3;
use shoreline_terrain::{MeshGeometry, WaterSource};

/// Distance travelled through water between a submerged `target` and the
/// water surface along the segment toward `source`, in physical units.
///
/// The surface crossing is found against the flat level `water_z`, then its
/// height is replaced by the local water level (capped at the source) to
/// follow ripples.
pub fn integrate_water_dist<W: WaterSource + ?Sized>(
    water: &W,
    geometry: &MeshGeometry,
    target: Vec3,
    source: Vec3,
    water_z: f32,
) -> f32 {
    if source.z == target.z {
        return 0.0;
    }
    let t = ((water_z - target.z) / (source.z - target.z).abs())
        .min(1.0)
        .max(0.0);
    let mut crossing = target + (source - target) * t;
    let (xp, yp) = (geometry.xpos(target.x), geometry.ypos(target.y));
    if !geometry.point_outside_mesh(xp, yp) {
        crossing.z = source.z.min(water.level(xp as usize, yp as usize));
    }
    crossing.distance(target) * geometry.mesh_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoreline_terrain::{Grid, TerrainFrame, TerrainSource};

    fn lake(depth: f32) -> TerrainFrame {
        let g = MeshGeometry::new(4, 4, 2.0, 2.0, 2.0).unwrap();
        TerrainFrame::new(g, Grid::filled(4, 4, -depth), Grid::filled(4, 4, Vec3::Z))
            .unwrap()
            .with_flat_water(0.0)
    }

    #[test]
    fn test_vertical_path_equals_depth() {
        let frame = lake(1.5);
        let target = Vec3::new(0.0, 0.0, -1.5);
        let d = integrate_water_dist(&frame, frame.geometry(), target, Vec3::new(0.0, 0.0, 10.0), 0.0);
        assert!((d - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_depth_gives_zero() {
        let frame = lake(0.0);
        let target = Vec3::new(0.0, 0.0, 0.0);
        let d = integrate_water_dist(&frame, frame.geometry(), target, Vec3::new(3.0, 1.0, 5.0), 0.0);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_equal_heights_gives_zero() {
        let frame = lake(1.0);
        let target = Vec3::new(0.0, 0.0, -1.0);
        let d = integrate_water_dist(&frame, frame.geometry(), target, Vec3::new(1.0, 0.0, -1.0), 0.0);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_mesh_scale_applies() {
        let frame = lake(1.0);
        let g = frame.geometry().with_mesh_scale(3.0);
        let target = Vec3::new(0.0, 0.0, -1.0);
        let d = integrate_water_dist(&frame, &g, target, Vec3::new(0.0, 0.0, 4.0), 0.0);
        assert!((d - 3.0).abs() < 1e-5);
    }
}
