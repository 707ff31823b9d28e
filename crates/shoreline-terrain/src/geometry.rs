//! Mapping between grid indices and world coordinates.
//!
//! The scene spans `[-x_scene_size, x_scene_size)` by `[-y_scene_size,
//! y_scene_size)` horizontally with Z up. Cell `(x, y)` sits at the lower
//! corner of its square, so the last column lies one spacing short of the
//! positive scene edge.

use glam::{Vec2, Vec3};

use crate::TerrainError;

/// Grid resolution and scene extents shared by every per-frame grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshGeometry {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Half-extent along X.
    pub x_scene_size: f32,
    /// Half-extent along Y.
    pub y_scene_size: f32,
    /// Half-extent along Z.
    pub z_scene_size: f32,
    /// World units to physical distance for water path lengths.
    pub mesh_scale: f32,
}

impl MeshGeometry {
    /// Create a geometry, rejecting grids too small to form a quad.
    pub fn new(
        width: usize,
        height: usize,
        x_scene_size: f32,
        y_scene_size: f32,
        z_scene_size: f32,
    ) -> Result<Self, TerrainError> {
        if width < 2 || height < 2 {
            return Err(TerrainError::TooSmall { width, height });
        }
        Ok(Self {
            width,
            height,
            x_scene_size,
            y_scene_size,
            z_scene_size,
            mesh_scale: 1.0,
        })
    }

    /// Builder-style override of the mesh scale.
    pub fn with_mesh_scale(mut self, mesh_scale: f32) -> Self {
        self.mesh_scale = mesh_scale;
        self
    }

    /// Spacing between columns.
    pub fn dx(&self) -> f32 {
        2.0 * self.x_scene_size / self.width as f32
    }

    /// Spacing between rows.
    pub fn dy(&self) -> f32 {
        2.0 * self.y_scene_size / self.height as f32
    }

    /// `(dx, dy)`.
    pub fn spacing(&self) -> Vec2 {
        Vec2::new(self.dx(), self.dy())
    }

    /// `(x_scene_size, y_scene_size)`.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.x_scene_size, self.y_scene_size)
    }

    /// `[width, height]`.
    pub fn dims(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Area of one grid cell.
    pub fn cell_area(&self) -> f32 {
        self.dx() * self.dy()
    }

    /// World X of column `x`.
    pub fn xval(&self, x: usize) -> f32 {
        -self.x_scene_size + self.dx() * x as f32
    }

    /// World Y of row `y`.
    pub fn yval(&self, y: usize) -> f32 {
        -self.y_scene_size + self.dy() * y as f32
    }

    /// Nearest column to world X (may be outside the grid).
    pub fn xpos(&self, x: f32) -> i32 {
        ((x + self.x_scene_size) / self.dx() + 0.5).floor() as i32
    }

    /// Nearest row to world Y (may be outside the grid).
    pub fn ypos(&self, y: f32) -> i32 {
        ((y + self.y_scene_size) / self.dy() + 0.5).floor() as i32
    }

    /// Returns `true` if the signed index pair lies outside the grid.
    pub fn point_outside_mesh(&self, x: i32, y: i32) -> bool {
        x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height
    }

    /// Nearest cell to a world position, if inside the grid.
    pub fn cell_at(&self, pos: Vec3) -> Option<(usize, usize)> {
        let (x, y) = (self.xpos(pos.x), self.ypos(pos.y));
        (!self.point_outside_mesh(x, y)).then_some((x as usize, y as usize))
    }

    /// World position of a grid vertex at the given elevation.
    pub fn point(&self, x: usize, y: usize, z: f32) -> Vec3 {
        Vec3::new(self.xval(x), self.yval(y), z)
    }

    /// Length comfortably larger than any segment inside the scene.
    pub fn ray_length(&self) -> f32 {
        self.x_scene_size + self.y_scene_size + self.z_scene_size
    }
}
