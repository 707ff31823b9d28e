//! Segment/heightfield intersection.

use glam::Vec3;

use crate::TerrainSource;

/// Refinement steps once a crossing has been bracketed.
const BISECTION_STEPS: u32 = 20;

/// First point where a segment passes below the terrain surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshHit {
    /// Column nearest to the hit.
    pub x: usize,
    /// Row nearest to the hit.
    pub y: usize,
    /// Hit position on the segment.
    pub point: Vec3,
    /// Parameter along the segment in `[0, 1]`.
    pub t: f32,
}

/// Bilinearly interpolated terrain height at a world XY, clamped to the grid.
pub fn interpolated_height<T: TerrainSource + ?Sized>(terrain: &T, x: f32, y: f32) -> f32 {
    let g = terrain.geometry();
    let fx = ((x + g.x_scene_size) / g.dx()).clamp(0.0, (g.width - 1) as f32);
    let fy = ((y + g.y_scene_size) / g.dy()).clamp(0.0, (g.height - 1) as f32);
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(g.width - 1);
    let y1 = (y0 + 1).min(g.height - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let h00 = terrain.height(x0, y0);
    let h10 = terrain.height(x1, y0);
    let h01 = terrain.height(x0, y1);
    let h11 = terrain.height(x1, y1);
    let top = h00 + (h10 - h00) * tx;
    let bottom = h01 + (h11 - h01) * tx;
    top + (bottom - top) * ty
}

/// Intersect the segment `p1 -> p2` with the heightfield.
///
/// The segment is clipped to the mesh footprint, then marched in steps of a
/// quarter cell; the first sample that reaches the surface is refined by
/// bisection. Returns `None` when the segment stays above the terrain inside
/// the footprint.
pub fn line_intersect_mesh<T: TerrainSource + ?Sized>(
    terrain: &T,
    p1: Vec3,
    p2: Vec3,
) -> Option<MeshHit> {
    let g = terrain.geometry();
    let lo = -g.half_extents();
    let hi = g.half_extents() - g.spacing();
    let (t0, t1) = clip_to_rect(p1, p2, lo.to_array(), hi.to_array())?;

    let below = |t: f32| {
        let p = p1 + (p2 - p1) * t;
        p.z <= interpolated_height(terrain, p.x, p.y)
    };

    let xy_len = (p2 - p1).truncate().length() * (t1 - t0);
    let step = 0.25 * g.dx().min(g.dy());
    let steps = ((xy_len / step).ceil() as usize).max(1);

    if below(t0) {
        return make_hit(terrain, p1, p2, t0);
    }
    let mut prev = t0;
    for i in 1..=steps {
        let t = t0 + (t1 - t0) * i as f32 / steps as f32;
        if below(t) {
            let (mut a, mut b) = (prev, t);
            for _ in 0..BISECTION_STEPS {
                let mid = 0.5 * (a + b);
                if below(mid) {
                    b = mid;
                } else {
                    a = mid;
                }
            }
            return make_hit(terrain, p1, p2, b);
        }
        prev = t;
    }
    None
}

fn make_hit<T: TerrainSource + ?Sized>(terrain: &T, p1: Vec3, p2: Vec3, t: f32) -> Option<MeshHit> {
    let point = p1 + (p2 - p1) * t;
    let (x, y) = terrain.geometry().cell_at(point)?;
    Some(MeshHit { x, y, point, t })
}

/// Parametric range of `p1 -> p2` whose XY lies within `[lo, hi]`.
fn clip_to_rect(p1: Vec3, p2: Vec3, lo: [f32; 2], hi: [f32; 2]) -> Option<(f32, f32)> {
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    let start = p1.to_array();
    let delta = (p2 - p1).to_array();

    for axis in 0..2 {
        if delta[axis] == 0.0 {
            if start[axis] < lo[axis] || start[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / delta[axis];
        let mut ta = (lo[axis] - start[axis]) * inv;
        let mut tb = (hi[axis] - start[axis]) * inv;
        if ta > tb {
            std::mem::swap(&mut ta, &mut tb);
        }
        t0 = t0.max(ta);
        t1 = t1.min(tb);
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}
