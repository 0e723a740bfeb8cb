use std::f32::consts::{PI, TAU};

use rand::Rng;

/// Circular area of the floor where no grass may grow
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExclusionZone {
    pub center: [f32; 2],
    pub radius: f32,
}

impl ExclusionZone {
    pub fn new(center: [f32; 2], radius: f32) -> Self {
        Self { center, radius }
    }

    /// Strictly inside the zone; points exactly on the edge are allowed
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let dx = x - self.center[0];
        let dz = z - self.center[1];
        (dx * dx + dz * dz).sqrt() < self.radius
    }
}

/// Placement of a single grass blade
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrassBlade {
    pub position: [f32; 3],
    /// Rotation around the vertical axis, [0, π)
    pub rotation_y: f32,
    /// Lean around the blade's z axis, [-0.1, 0.1)
    pub tilt_z: f32,
    /// Uniform scale, [0.8, 1.2)
    pub scale: f32,
}

impl GrassBlade {
    /// Top of the blade for a blade of the given unscaled height
    pub fn tip(&self, height: f32) -> [f32; 3] {
        let reach = 0.5 * height * self.scale;
        // Lean sideways along the blade plane, which is rotated about y
        let lean = self.tilt_z.sin() * reach;
        [
            self.position[0] - lean * self.rotation_y.cos(),
            self.position[1] + self.tilt_z.cos() * reach,
            self.position[2] + lean * self.rotation_y.sin(),
        ]
    }
}

/// Scatter up to `attempts` blades uniformly over a disc of `spread_radius`.
///
/// Attempts landing inside any exclusion zone are dropped, not retried, so
/// fewer than `attempts` blades come back whenever a zone overlaps the disc.
pub fn scatter_grass<R: Rng + ?Sized>(
    rng: &mut R,
    attempts: usize,
    spread_radius: f32,
    height: f32,
    zones: &[ExclusionZone],
) -> Vec<GrassBlade> {
    let mut blades = Vec::with_capacity(attempts);

    for _ in 0..attempts {
        let angle = rng.gen::<f32>() * TAU;
        // sqrt keeps the density uniform over the disc area
        let r = rng.gen::<f32>().sqrt() * spread_radius;
        let x = angle.cos() * r;
        let z = angle.sin() * r;

        if zones.iter().any(|zone| zone.contains(x, z)) {
            continue;
        }

        blades.push(GrassBlade {
            position: [x, height, z],
            rotation_y: rng.gen::<f32>() * PI,
            tilt_z: (rng.gen::<f32>() - 0.5) * 0.2,
            scale: 0.8 + rng.gen::<f32>() * 0.4,
        });
    }

    log::debug!("Scattered {} of {} grass blades", blades.len(), attempts);
    blades
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn garden_zones() -> [ExclusionZone; 2] {
        [
            ExclusionZone::new([-10.0, 5.0], 5.0),
            ExclusionZone::new([0.0, 0.0], 4.0),
        ]
    }

    #[test]
    fn test_zone_contains() {
        let zone = ExclusionZone::new([-10.0, 5.0], 5.0);
        assert!(zone.contains(-10.0, 5.0));
        assert!(zone.contains(-7.0, 8.0));
        assert!(!zone.contains(-5.0, 5.0), "edge is outside");
        assert!(!zone.contains(10.0, 10.0));
    }

    #[test]
    fn test_grass_avoids_zones() {
        let zones = garden_zones();
        let blades = scatter_grass(&mut StdRng::seed_from_u64(17), 1000, 20.0, 0.25, &zones);

        assert!(!blades.is_empty());
        assert!(blades.len() < 1000, "zones overlap the disc, some attempts must drop");
        for blade in &blades {
            let [x, y, z] = blade.position;
            assert_eq!(y, 0.25);
            assert!((x * x + z * z).sqrt() <= 20.0 + 1e-4);
            for zone in &zones {
                assert!(!zone.contains(x, z), "blade at ({}, {}) inside {:?}", x, z, zone);
            }
        }
    }

    #[test]
    fn test_blade_attributes_in_range() {
        let blades = scatter_grass(&mut StdRng::seed_from_u64(5), 500, 20.0, 0.25, &[]);
        assert_eq!(blades.len(), 500);
        for blade in &blades {
            assert!((0.0..PI).contains(&blade.rotation_y));
            assert!((-0.1..0.1).contains(&blade.tilt_z));
            assert!((0.8..1.2).contains(&blade.scale));
        }
    }

    #[test]
    fn test_zone_covering_everything() {
        let zones = [ExclusionZone::new([0.0, 0.0], 100.0)];
        let blades = scatter_grass(&mut StdRng::seed_from_u64(1), 200, 20.0, 0.25, &zones);
        assert!(blades.is_empty());
    }

    #[test]
    fn test_upright_tip() {
        let blade = GrassBlade {
            position: [1.0, 0.25, 2.0],
            rotation_y: 0.3,
            tilt_z: 0.0,
            scale: 1.0,
        };
        let tip = blade.tip(0.5);
        assert!((tip[0] - 1.0).abs() < 1e-6);
        assert!((tip[1] - 0.5).abs() < 1e-6);
        assert!((tip[2] - 2.0).abs() < 1e-6);
    }
}
