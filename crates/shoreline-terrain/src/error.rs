//! Terrain data error types.

/// Errors raised while assembling per-frame terrain data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A grid's dimensions differ from the frame's.
    #[error("{name} grid is {found:?}, expected {expected:?}")]
    DimensionMismatch {
        /// Which grid was rejected.
        name: &'static str,
        /// Frame dimensions `(width, height)`.
        expected: (usize, usize),
        /// Dimensions of the rejected grid.
        found: (usize, usize),
    },

    /// Grids need at least 2x2 cells to form a mesh.
    #[error("terrain grid must be at least 2x2, got {width}x{height}")]
    TooSmall {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
}
