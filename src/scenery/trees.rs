use std::f32::consts::TAU;

use crate::config::{
    LEAVES_CENTER_Y, LEAVES_HEIGHT, LEAVES_RADIUS, TREE_POSITIONS, TRUNK_CENTER_Y, TRUNK_HEIGHT,
    TRUNK_RADIUS_BOTTOM, TRUNK_RADIUS_TOP,
};

/// Horizontal slices sampled per tree part
const SLICES: usize = 6;
/// Markers per slice ring
const RING_SEGMENTS: usize = 8;

/// A tree standing on the floor: cylinder trunk under a cone of leaves
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tree {
    pub x: f32,
    pub z: f32,
}

/// Vertical solid of revolution, radius varying linearly from bottom to top
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub center_y: f32,
    pub height: f32,
    pub radius_bottom: f32,
    pub radius_top: f32,
}

impl Frustum {
    pub fn bottom(&self) -> f32 {
        self.center_y - self.height / 2.0
    }

    #[cfg(test)]
    pub fn top(&self) -> f32 {
        self.center_y + self.height / 2.0
    }

    /// Ring samples on the surface, bottom slice first
    pub fn surface_points(&self, x: f32, z: f32) -> Vec<[f32; 3]> {
        let mut points = Vec::with_capacity(SLICES * RING_SEGMENTS);
        for slice in 0..SLICES {
            let t = slice as f32 / (SLICES - 1) as f32;
            let y = self.bottom() + t * self.height;
            let radius = self.radius_bottom + (self.radius_top - self.radius_bottom) * t;
            if radius <= f32::EPSILON {
                points.push([x, y, z]);
                continue;
            }
            for segment in 0..RING_SEGMENTS {
                let angle = segment as f32 / RING_SEGMENTS as f32 * TAU;
                points.push([x + angle.cos() * radius, y, z + angle.sin() * radius]);
            }
        }
        points
    }
}

impl Tree {
    pub fn trunk(&self) -> Frustum {
        Frustum {
            center_y: TRUNK_CENTER_Y,
            height: TRUNK_HEIGHT,
            radius_bottom: TRUNK_RADIUS_BOTTOM,
            radius_top: TRUNK_RADIUS_TOP,
        }
    }

    pub fn leaves(&self) -> Frustum {
        Frustum {
            center_y: LEAVES_CENTER_Y,
            height: LEAVES_HEIGHT,
            radius_bottom: LEAVES_RADIUS,
            radius_top: 0.0,
        }
    }
}

/// The fixed ring of trees around the house
pub fn tree_layout() -> Vec<Tree> {
    TREE_POSITIONS.iter().map(|&[x, z]| Tree { x, z }).collect()
}
