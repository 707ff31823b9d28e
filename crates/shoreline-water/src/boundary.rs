//! Back-to-front water side faces.
//!
//! The water volume is cut off at the four scene edges. Each edge gets a
//! vertical skirt of quads from the water surface down to the terrain. When
//! the camera looks at the inside of a skirt, the view ray crosses the water
//! volume first, so each vertex is darkened and made more opaque by the
//! length of that crossing.

use glam::{Vec2, Vec3, Vec4};
use shoreline_config::Config;
use shoreline_lighting::WaterAttenuation;
use shoreline_terrain::{MeshGeometry, TerrainSource, WaterSource};

use crate::SceneBox;

/// One of the four scene edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    NegX,
    PosX,
    NegY,
    PosY,
}

impl BoundarySide {
    pub const ALL: [Self; 4] = [Self::NegX, Self::PosX, Self::NegY, Self::PosY];

    /// Axis the side faces along: 0 for X sides, 1 for Y sides.
    pub fn axis(self) -> usize {
        match self {
            Self::NegX | Self::PosX => 0,
            Self::NegY | Self::PosY => 1,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Self::NegX | Self::NegY)
    }

    /// Midpoint of the edge at the water plane, used for depth sorting.
    pub fn anchor(self, half: Vec2, plane_z: f32) -> Vec3 {
        match self {
            Self::NegX => Vec3::new(-half.x, 0.0, plane_z),
            Self::PosX => Vec3::new(half.x, 0.0, plane_z),
            Self::NegY => Vec3::new(0.0, -half.y, plane_z),
            Self::PosY => Vec3::new(0.0, half.y, plane_z),
        }
    }

    /// Shared normal of the side's quads.
    pub fn normal(self) -> Vec3 {
        match self.axis() {
            0 => Vec3::NEG_X,
            _ => Vec3::Y,
        }
    }
}

/// A colored, textured corner of a boundary quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec4,
    pub uv: Vec2,
}

/// Consumer of boundary quads.
pub trait QuadEmitter {
    fn emit_quad(&mut self, side: BoundarySide, quad: &[BoundaryVertex; 4]);
}

impl QuadEmitter for Vec<(BoundarySide, [BoundaryVertex; 4])> {
    fn emit_quad(&mut self, side: BoundarySide, quad: &[BoundaryVertex; 4]) {
        self.push((side, *quad));
    }
}

/// Builds the four water skirts for a frame.
#[derive(Clone, Copy, Debug)]
pub struct WaterBoundaryRenderer {
    pub attenuation: WaterAttenuation,
    /// Color of a skirt seen from outside the water.
    pub base_color: Vec4,
    /// Distance multiplier applied before attenuation.
    pub color_attenuation: f32,
    /// Only emit quads where terrain dips below the water.
    pub skip_dry_edges: bool,
    /// Depth below the water level that still counts as dry.
    pub depth_epsilon: f32,
}

impl WaterBoundaryRenderer {
    pub fn from_config(config: &Config) -> Self {
        let water = &config.water;
        Self {
            attenuation: WaterAttenuation::new(Vec3::from_array(water.absorption)),
            base_color: Vec4::from_array(water.boundary_color),
            color_attenuation: water.color_attenuation,
            skip_dry_edges: water.skip_dry_edges,
            depth_epsilon: water.depth_epsilon,
        }
    }

    /// Sides ordered farthest to nearest from the camera.
    pub fn draw_order(geometry: &MeshGeometry, camera: Vec3, plane_z: f32) -> [BoundarySide; 4] {
        let half = geometry.half_extents();
        let mut sides = BoundarySide::ALL.map(|side| {
            (side.anchor(half, plane_z).distance_squared(camera), side)
        });
        sides.sort_by(|a, b| b.0.total_cmp(&a.0));
        sides.map(|(_, side)| side)
    }

    /// Emit every side back to front and return the order used.
    pub fn draw<F, E>(&self, frame: &F, camera: Vec3, emitter: &mut E) -> [BoundarySide; 4]
    where
        F: TerrainSource + WaterSource + ?Sized,
        E: QuadEmitter + ?Sized,
    {
        let geometry = *frame.geometry();
        let order = Self::draw_order(&geometry, camera, frame.plane_z());
        let z_bottom = (0..geometry.height)
            .flat_map(|y| (0..geometry.width).map(move |x| frame.height(x, y)))
            .fold(f32::INFINITY, f32::min);

        let mut quads = 0;
        for side in order {
            quads += self.draw_side(frame, side, camera, z_bottom, emitter);
        }
        tracing::debug!(?order, quads, "water boundary drawn");
        order
    }

    fn draw_side<F, E>(
        &self,
        frame: &F,
        side: BoundarySide,
        camera: Vec3,
        z_bottom: f32,
        emitter: &mut E,
    ) -> usize
    where
        F: TerrainSource + WaterSource + ?Sized,
        E: QuadEmitter + ?Sized,
    {
        let g = *frame.geometry();
        let along_x = side.axis() == 1;
        let len = if along_x { g.width } else { g.height };
        let edge = match side {
            BoundarySide::NegX | BoundarySide::NegY => 0,
            BoundarySide::PosX => g.width - 1,
            BoundarySide::PosY => g.height - 1,
        };
        let cell = |k: usize| if along_x { (k, edge) } else { (edge, k) };
        let world = |k: usize, z: f32| {
            let (x, y) = cell(k);
            g.point(x, y, z)
        };
        let scene = |z_top: f32| {
            let half = g.half_extents();
            SceneBox::new(
                Vec3::new(-half.x, -half.y, z_bottom),
                Vec3::new(half.x, half.y, z_top),
            )
        };

        let mut emitted = 0;
        for k in 1..len {
            let (x1, y1) = cell(k);
            let (x2, y2) = cell(k - 1);
            let (mh1, mh2) = (frame.height(x1, y1), frame.height(x2, y2));
            let wm1 = frame.level(x1, y1) - self.depth_epsilon;
            let wm2 = frame.level(x2, y2) - self.depth_epsilon;
            if self.skip_dry_edges && !(mh1 < wm1 || mh2 < wm2) {
                continue;
            }
            let corners = [
                world(k - 1, wm2),
                world(k, wm1),
                world(k, wm1.min(mh1)),
                world(k - 1, wm2.min(mh2)),
            ];
            let quad = corners.map(|p| self.vertex(side, p, camera, &scene(p.z), &g));
            emitter.emit_quad(side, &quad);
            emitted += 1;
        }
        emitted
    }

    fn vertex(
        &self,
        side: BoundarySide,
        p: Vec3,
        camera: Vec3,
        scene: &SceneBox,
        g: &MeshGeometry,
    ) -> BoundaryVertex {
        let axis = side.axis();
        let mut color = self.base_color;
        if (camera[axis] - p[axis] < 0.0) ^ side.is_negative() {
            let dist = scene
                .clip_segment(p, camera)
                .map_or(0.0, |(a, b)| a.distance(b));
            let falloff = self.attenuation.attenuate(self.color_attenuation * dist);
            color = falloff.apply(color.truncate()).extend(falloff.alpha);
        }
        let s = 1.0 / g.z_scene_size;
        let uv = if axis == 0 {
            Vec2::new(p.z, p.y) * s
        } else {
            Vec2::new(p.x, p.z) * s
        };
        BoundaryVertex {
            position: p,
            normal: side.normal(),
            color,
            uv,
        }
    }
}
