//! Procedural heightfields and surface normals.
//!
//! Real terrain comes from the world generator; this fBm sampler feeds the
//! demo and tests with plausible shorelines.

use glam::Vec3;
use noise::{NoiseFn, Simplex};

use crate::{Grid, MeshGeometry};

/// Configuration for multi-octave fBm noise used in heightmap generation.
#[derive(Clone, Debug)]
pub struct HeightmapParams {
    /// Seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first (lowest) octave, in cycles per world unit.
    pub base_frequency: f64,
    /// Amplitude of the first octave in world units.
    pub amplitude: f64,
    /// Constant added to every sample.
    pub offset: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.35,
            amplitude: 1.0,
            offset: 0.0,
        }
    }
}

/// Fractal Brownian motion over simplex noise.
pub struct HeightmapSampler {
    noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapSampler {
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed as u32);
        Self { noise, params }
    }

    /// Height at a world XY coordinate.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = self.params.offset;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.get([x * frequency, y * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Theoretical maximum deviation from the offset (geometric series sum).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Sample every grid vertex of `geometry`.
    pub fn height_grid(&self, geometry: &MeshGeometry) -> Grid<f32> {
        Grid::from_fn(geometry.width, geometry.height, |x, y| {
            self.sample(geometry.xval(x) as f64, geometry.yval(y) as f64) as f32
        })
    }

}

/// Unit normals of a height grid from central differences (one-sided at the
/// borders).
pub fn surface_normals(heights: &Grid<f32>, geometry: &MeshGeometry) -> Grid<Vec3> {
    let (w, h) = heights.dims();
    Grid::from_fn(w, h, |x, y| {
        let (x0, x1) = (x.saturating_sub(1), (x + 1).min(w - 1));
        let (y0, y1) = (y.saturating_sub(1), (y + 1).min(h - 1));
        let dzdx = (heights.get(x1, y) - heights.get(x0, y)) / ((x1 - x0) as f32 * geometry.dx());
        let dzdy = (heights.get(x, y1) - heights.get(x, y0)) / ((y1 - y0) as f32 * geometry.dy());
        Vec3::new(-dzdx, -dzdy, 1.0).normalize()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_determinism_same_seed_same_coord() {
        let params = HeightmapParams {
            seed: 42,
            ..Default::default()
        };
        let a = HeightmapSampler::new(params.clone());
        let b = HeightmapSampler::new(params);
        assert!((a.sample(1.5, -2.0) - b.sample(1.5, -2.0)).abs() < EPSILON);
    }

    #[test]
    fn test_height_within_expected_range() {
        let sampler = HeightmapSampler::new(HeightmapParams {
            offset: -0.25,
            ..Default::default()
        });
        let max_amp = sampler.max_amplitude();
        for i in 0..50 {
            for j in 0..50 {
                let h = sampler.sample(i as f64 * 0.3, j as f64 * 0.3);
                assert!((h + 0.25).abs() <= max_amp + EPSILON);
            }
        }
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let sampler = HeightmapSampler::new(HeightmapParams {
            amplitude: 1000.0,
            persistence: 0.5,
            octaves: 4,
            ..Default::default()
        });
        assert!((sampler.max_amplitude() - 1875.0).abs() < EPSILON);
    }

    #[test]
    fn test_height_grid_matches_dims() {
        let geometry = MeshGeometry::new(6, 5, 3.0, 2.5, 1.0).unwrap();
        let grid = HeightmapSampler::new(HeightmapParams::default()).height_grid(&geometry);
        assert_eq!(grid.dims(), (6, 5));
    }

    #[test]
    fn test_flat_normals_point_up() {
        let geometry = MeshGeometry::new(4, 4, 2.0, 2.0, 1.0).unwrap();
        let normals = surface_normals(&Grid::filled(4, 4, 0.3), &geometry);
        assert!(normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn test_slope_normal_leans_downhill() {
        let geometry = MeshGeometry::new(4, 4, 2.0, 2.0, 1.0).unwrap();
        let heights = Grid::from_fn(4, 4, |x, _| x as f32);
        let n = *surface_normals(&heights, &geometry).get(1, 1);
        assert!(n.x < 0.0);
        assert!(n.y.abs() < 1e-6);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
