//! Static garden around the galaxy: floor, pond, trees and grass.
//!
//! Everything is flattened into coloured marker points so it can share the
//! galaxy's point pipeline.

mod grass;
mod trees;

pub use grass::{scatter_grass, ExclusionZone, GrassBlade};
pub use trees::{tree_layout, Tree};

use std::f32::consts::TAU;

use rand::Rng;

use crate::config::{
    FLOOR_COLOR, FLOOR_RADIUS, GRASS_ATTEMPTS, GRASS_COLOR, GRASS_HOUSE_CLEARANCE,
    GRASS_POND_CLEARANCE, GRASS_SPREAD_RADIUS, GRASS_Y, LEAVES_COLOR, POND_CENTER, POND_COLOR,
    POND_RADIUS, TRUNK_COLOR,
};
use crate::galaxy::{ColorParseError, Rgb};

/// Unscaled grass blade height
const GRASS_BLADE_HEIGHT: f32 = 0.5;
/// Spacing between concentric rings on flat discs
const DISC_RING_SPACING: f32 = 1.0;

/// Interleaved xyz positions and linear rgb colours
#[derive(Clone, Debug, Default)]
pub struct MarkerSet {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl MarkerSet {
    pub fn push(&mut self, position: [f32; 3], color: Rgb) {
        self.positions.extend_from_slice(&position);
        self.colors.extend_from_slice(&color.to_array());
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Concentric rings filling a horizontal disc
    pub fn push_disc(&mut self, center: [f32; 3], radius: f32, color: Rgb) {
        self.push(center, color);
        let rings = (radius / DISC_RING_SPACING).ceil().max(1.0) as usize;
        for ring in 1..=rings {
            let r = radius * ring as f32 / rings as f32;
            // Keep arc spacing roughly constant
            let segments = ((TAU * r / DISC_RING_SPACING).round() as usize).max(8);
            for segment in 0..segments {
                let angle = segment as f32 / segments as f32 * TAU;
                self.push(
                    [center[0] + angle.cos() * r, center[1], center[2] + angle.sin() * r],
                    color,
                );
            }
        }
    }
}

/// Generated scene layout plus its marker rendition
pub struct Scenery {
    pub trees: Vec<Tree>,
    pub grass: Vec<GrassBlade>,
    pub markers: MarkerSet,
}

impl Scenery {
    pub fn build<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, ColorParseError> {
        let floor_color = Rgb::from_hex(FLOOR_COLOR)?;
        let pond_color = Rgb::from_hex(POND_COLOR)?;
        let trunk_color = Rgb::from_hex(TRUNK_COLOR)?;
        let leaves_color = Rgb::from_hex(LEAVES_COLOR)?;
        let grass_color = Rgb::from_hex(GRASS_COLOR)?;

        let zones = [
            ExclusionZone::new([POND_CENTER[0], POND_CENTER[2]], GRASS_POND_CLEARANCE),
            ExclusionZone::new([0.0, 0.0], GRASS_HOUSE_CLEARANCE),
        ];
        let grass = scatter_grass(rng, GRASS_ATTEMPTS, GRASS_SPREAD_RADIUS, GRASS_Y, &zones);
        let trees = tree_layout();

        let mut markers = MarkerSet::default();
        markers.push_disc([0.0, 0.0, 0.0], FLOOR_RADIUS, floor_color);
        markers.push_disc(POND_CENTER, POND_RADIUS, pond_color);
        for tree in &trees {
            for point in tree.trunk().surface_points(tree.x, tree.z) {
                markers.push(point, trunk_color);
            }
            for point in tree.leaves().surface_points(tree.x, tree.z) {
                markers.push(point, leaves_color);
            }
        }
        for blade in &grass {
            markers.push(blade.position, grass_color);
            markers.push(blade.tip(GRASS_BLADE_HEIGHT), grass_color);
        }

        log::info!(
            "Scenery: {} trees, {} grass blades, {} markers",
            trees.len(),
            grass.len(),
            markers.len()
        );

        Ok(Self {
            trees,
            grass,
            markers,
        })
    }
}
