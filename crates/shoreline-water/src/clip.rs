//! Segment clipping against an axis-aligned box.

use glam::Vec3;

/// Axis-aligned box, inclusive on every face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl SceneBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The part of `p1 -> p2` inside the box, if any (Liang-Barsky).
    pub fn clip_segment(&self, p1: Vec3, p2: Vec3) -> Option<(Vec3, Vec3)> {
        let d = p2 - p1;
        let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
        for axis in 0..3 {
            let checks = [
                (-d[axis], p1[axis] - self.min[axis]),
                (d[axis], self.max[axis] - p1[axis]),
            ];
            for (p, q) in checks {
                if p == 0.0 {
                    if q < 0.0 {
                        return None;
                    }
                    continue;
                }
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
        (t0 <= t1).then(|| (p1 + d * t0, p1 + d * t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> SceneBox {
        SceneBox::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_inside_segment_unchanged() {
        let a = Vec3::new(-0.5, 0.0, 0.2);
        let b = Vec3::new(0.5, 0.3, -0.2);
        let (c, d) = unit().clip_segment(a, b).unwrap();
        assert!((c - a).length() < 1e-6 && (d - b).length() < 1e-6);
    }

    #[test]
    fn test_exit_point() {
        let (a, b) = unit()
            .clip_segment(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(a, Vec3::ZERO);
        assert!((b - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_crossing_segment() {
        let (a, b) = unit()
            .clip_segment(Vec3::new(-3.0, 0.5, 0.0), Vec3::new(3.0, 0.5, 0.0))
            .unwrap();
        assert!((a.x + 1.0).abs() < 1e-6 && (b.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_miss() {
        let clipped = unit().clip_segment(Vec3::new(2.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0));
        assert_eq!(clipped, None);
    }
}
