//! Persistent surface damage (scorch marks) that heals over time.

use shoreline_terrain::Grid;

/// Default upper bound on accumulated damage.
pub const MAX_DAMAGE: f32 = 20.0;

/// Per-vertex damage in `[0, max]`, carried across frames.
///
/// Written by damage events and healed each time a vertex is composed. Only
/// one writer at a time: every mutation goes through `&mut self`.
#[derive(Clone, Debug)]
pub struct SurfaceDamage {
    grid: Grid<f32>,
    max: f32,
}

impl SurfaceDamage {
    /// Undamaged surface capped at [`MAX_DAMAGE`].
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_max(width, height, MAX_DAMAGE)
    }

    pub fn with_max(width: usize, height: usize, max: f32) -> Self {
        Self {
            grid: Grid::filled(width, height, 0.0),
            max,
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        self.grid.dims()
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        *self.grid.get(x, y)
    }

    /// Add damage at a vertex, saturating at the maximum.
    pub fn damage(&mut self, x: usize, y: usize, amount: f32) {
        let d = self.grid.get_mut(x, y);
        *d = (*d + amount.max(0.0)).min(self.max);
    }

    /// Heal a damaged vertex by `amount` and return the remaining damage.
    ///
    /// Undamaged vertices are left untouched.
    pub fn heal(&mut self, x: usize, y: usize, amount: f32) -> f32 {
        let max = self.max;
        let d = self.grid.get_mut(x, y);
        if *d > 0.0 {
            *d = (*d - amount).max(0.0).min(max);
        }
        *d
    }

    /// Total damage across the surface.
    pub fn total(&self) -> f32 {
        self.grid.iter().sum()
    }
}
