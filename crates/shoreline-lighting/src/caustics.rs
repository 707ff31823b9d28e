//! Underwater caustics: light refracted through the water surface is traced
//! onto the submerged terrain and integrated into a per-cell ratio grid.
//!
//! Every underwater cell fires one ray from the light through its water
//! surface point. Four neighbouring hits bound a patch of light on the
//! terrain; each patch spreads unit energy over the cells its bounding
//! rectangle covers. The ratio of received energy to cell area is the local
//! focusing factor: above 1 where light converges, below 1 where it spreads.

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use shoreline_terrain::{Grid, MeshGeometry, TerrainSource, WaterSource, line_intersect_mesh};

use crate::refraction::{WATER_REFRACTION_INDEX, refract};

/// Accumulated light for one terrain cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CausticRatio {
    /// Patch energy received, each patch weighted by its inverse area.
    pub numerator: f32,
    /// Covered area, weighted by the inverse cell area.
    pub denominator: f32,
}

impl CausticRatio {
    /// Light focusing factor; `1.0` for cells no patch touched.
    pub fn value(&self) -> f32 {
        if self.denominator == 0.0 {
            1.0
        } else {
            self.numerator / self.denominator
        }
    }
}

/// Per-cell caustic ratios for the current frame.
///
/// An empty grid means caustics were not computed this frame and every
/// lookup is neutral.
#[derive(Clone, Debug, Default)]
pub struct CausticGrid {
    cells: Option<Grid<CausticRatio>>,
}

impl CausticGrid {
    /// An empty grid (caustics disabled).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_none()
    }

    /// Drop all data; subsequent lookups return `1.0`.
    pub fn clear(&mut self) {
        self.cells = None;
    }

    /// Zero every accumulator, reallocating if the dimensions changed.
    pub fn reset(&mut self, width: usize, height: usize) -> &mut Grid<CausticRatio> {
        let cells = match self.cells.take() {
            Some(mut cells) if cells.dims() == (width, height) => {
                cells.fill(CausticRatio::default());
                cells
            }
            _ => Grid::filled(width, height, CausticRatio::default()),
        };
        self.cells.insert(cells)
    }

    /// Focusing factor at a cell, `1.0` when empty.
    pub fn ratio(&self, x: usize, y: usize) -> f32 {
        self.cells.as_ref().map_or(1.0, |cells| cells.get(x, y).value())
    }

    /// Raw accumulators, if computed this frame.
    pub fn cells(&self) -> Option<&Grid<CausticRatio>> {
        self.cells.as_ref()
    }
}

/// Axis-aligned bounds of a light patch on the terrain, in world XY.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightPatch {
    pub min: Vec2,
    pub max: Vec2,
}

impl LightPatch {
    /// Bounding rectangle of four terrain hits.
    ///
    /// # Panics
    ///
    /// Panics if the corners collapse to zero width or height.
    pub fn from_corners(corners: [Vec3; 4]) -> Self {
        let mut min = corners[0].truncate();
        let mut max = min;
        for c in &corners[1..] {
            min = min.min(c.truncate());
            max = max.max(c.truncate());
        }
        let patch = Self { min, max };
        assert!(
            patch.min.x < patch.max.x && patch.min.y < patch.max.y,
            "degenerate light patch {patch:?}"
        );
        patch
    }

    pub fn area(&self) -> f32 {
        let size = self.max - self.min;
        size.x * size.y
    }
}

/// Counters from one projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// Cells whose terrain lies below the water surface.
    pub underwater_cells: usize,
    /// Refracted rays that reached the terrain.
    pub hits: usize,
    /// Complete 2x2 blocks accumulated.
    pub patches: usize,
}

/// Traces refracted light through the water surface onto the terrain.
#[derive(Clone, Copy, Debug)]
pub struct CausticsProjector {
    refraction_index: f32,
    parallel: bool,
}

impl Default for CausticsProjector {
    fn default() -> Self {
        Self::new(WATER_REFRACTION_INDEX)
    }
}

impl CausticsProjector {
    pub fn new(refraction_index: f32) -> Self {
        Self {
            refraction_index,
            parallel: true,
        }
    }

    /// Trace each scanline's rays on the rayon pool (default) or inline.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rebuild `out` from scratch for a light at `light_pos`.
    ///
    /// # Panics
    ///
    /// Panics if a ray entering the water undergoes total internal
    /// reflection, or if a patch is degenerate.
    pub fn project<F>(&self, frame: &F, light_pos: Vec3, out: &mut CausticGrid) -> ProjectionStats
    where
        F: TerrainSource + WaterSource + Sync + ?Sized,
    {
        let geometry = *frame.geometry();
        let (w, h) = (geometry.width, geometry.height);
        let cells = out.reset(w, h);
        let mut stats = ProjectionStats::default();

        let mut prev: Vec<Option<Vec3>> = vec![None; w];
        let mut cur: Vec<Option<Vec3>> = vec![None; w];

        for y in 0..h {
            self.trace_row(frame, y, light_pos, &mut cur);
            stats.underwater_cells += (0..w).filter(|&x| is_submerged(frame, x, y)).count();
            stats.hits += cur.iter().filter(|hit| hit.is_some()).count();

            if y > 0 {
                for x in 1..w {
                    if let (Some(a), Some(b), Some(c), Some(d)) =
                        (prev[x - 1], prev[x], cur[x - 1], cur[x])
                    {
                        let patch = LightPatch::from_corners([a, b, c, d]);
                        accumulate_patch(cells, &geometry, &patch);
                        stats.patches += 1;
                    }
                }
            }

            std::mem::swap(&mut prev, &mut cur);
            cur.fill(None);
        }

        tracing::debug!(
            underwater = stats.underwater_cells,
            hits = stats.hits,
            patches = stats.patches,
            "caustics projected"
        );
        stats
    }

    fn trace_row<F>(&self, frame: &F, y: usize, light_pos: Vec3, row: &mut [Option<Vec3>])
    where
        F: TerrainSource + WaterSource + Sync + ?Sized,
    {
        if self.parallel {
            row.par_iter_mut()
                .enumerate()
                .for_each(|(x, slot)| *slot = self.surface_hit(frame, x, y, light_pos));
        } else {
            for (x, slot) in row.iter_mut().enumerate() {
                *slot = self.surface_hit(frame, x, y, light_pos);
            }
        }
    }

    /// Where light entering the water above `(x, y)` lands on the terrain.
    fn surface_hit<F>(&self, frame: &F, x: usize, y: usize, light_pos: Vec3) -> Option<Vec3>
    where
        F: TerrainSource + WaterSource + ?Sized,
    {
        if !is_submerged(frame, x, y) {
            return None;
        }
        let geometry = frame.geometry();
        let p1 = geometry.point(x, y, frame.level(x, y));
        let refracted = refract(
            p1 - light_pos,
            frame.surface_normal(x, y),
            1.0,
            self.refraction_index,
        );
        let Some(dir) = refracted else {
            panic!("total internal reflection entering water at ({x}, {y}) from {light_pos}");
        };
        let p2 = p1 + dir * geometry.ray_length();
        if p1.z == p2.z {
            return None;
        }
        line_intersect_mesh(frame, p1, p2).map(|hit| hit.point)
    }
}

fn is_submerged<F>(frame: &F, x: usize, y: usize) -> bool
where
    F: TerrainSource + WaterSource + ?Sized,
{
    frame.height(x, y) < frame.level(x, y)
}

/// Spread one patch's light over the terrain cells under its bounds.
///
/// Each covered cell receives `overlap / patch_area` in its numerator and
/// `overlap / cell_area` in its denominator, so the numerators of a patch
/// inside the grid sum to one.
///
/// # Panics
///
/// Panics if the derived index bounds leave the grid.
pub fn accumulate_patch(cells: &mut Grid<CausticRatio>, geometry: &MeshGeometry, patch: &LightPatch) {
    let spacing = geometry.spacing();
    let half = geometry.half_extents();
    let dims = geometry.dims();
    let weight_n = 1.0 / patch.area();
    let weight_d = 1.0 / geometry.cell_area();

    let mut lo = [0_usize; 2];
    let mut hi = [0_usize; 2];
    for d in 0..2 {
        let first = ((patch.min[d] + half[d]) / spacing[d]).floor().max(0.0);
        let last = ((patch.max[d] + half[d]) / spacing[d]).ceil().min(dims[d] as f32);
        assert!(
            first <= last,
            "light patch bounds [{first}, {last}) inverted on axis {d}"
        );
        lo[d] = first as usize;
        hi[d] = last as usize;
    }

    for yy in lo[1]..hi[1] {
        let cell_y = -half.y + spacing.y * yy as f32;
        let ysz = (cell_y + spacing.y).min(patch.max.y) - cell_y.max(patch.min.y);
        if ysz <= 0.0 {
            continue;
        }
        for xx in lo[0]..hi[0] {
            let cell_x = -half.x + spacing.x * xx as f32;
            let xsz = (cell_x + spacing.x).min(patch.max.x) - cell_x.max(patch.min.x);
            if xsz <= 0.0 {
                continue;
            }
            let overlap = xsz * ysz;
            let cell = cells.get_mut(xx, yy);
            cell.numerator += weight_n * overlap;
            cell.denominator += weight_d * overlap;
        }
    }
}
