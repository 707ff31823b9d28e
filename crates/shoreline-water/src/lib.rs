//! Transparent side faces of the water volume, seen through the scene edges.

mod boundary;
mod clip;

pub use boundary::{BoundarySide, BoundaryVertex, QuadEmitter, WaterBoundaryRenderer};
pub use clip::SceneBox;
