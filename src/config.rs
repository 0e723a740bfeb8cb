/// Window size at startup (logical pixels)
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;

/// Environment variable holding an optional u64 RNG seed
pub const SEED_ENV_VAR: &str = "GALAXY_SEED";

// ============================================
// Galaxy Defaults
// ============================================

pub const DEFAULT_COUNT: usize = 200_000;
pub const DEFAULT_SIZE: f32 = 0.02;
/// Clamped to the radius slider maximum
pub const DEFAULT_RADIUS: f32 = 20.0;
pub const DEFAULT_BRANCHES: u32 = 3;
pub const DEFAULT_SPIN: f32 = 1.0;
pub const DEFAULT_RANDOMNESS: f32 = 0.2;
pub const DEFAULT_RANDOMNESS_POWER: f32 = 3.0;
pub const DEFAULT_INSIDE_COLOR: &str = "#ff6030";
pub const DEFAULT_OUTSIDE_COLOR: &str = "#1b3984";
pub const DEFAULT_WAVE_SPEED: f32 = 1.0;
pub const DEFAULT_WAVE_HEIGHT: f32 = 0.2;
pub const DEFAULT_GALAXY_Y: f32 = 10.0;

/// Spatial frequency of the wave along the rest x coordinate
pub const WAVE_X_FREQUENCY: f32 = 0.1;

/// Inside/outside pairs cycled by the colour key
pub const COLOR_PRESETS: [(&str, &str); 4] = [
    ("#ff6030", "#1b3984"),
    ("#ffd27f", "#5a1e8c"),
    ("#7fffd4", "#0b3d91"),
    ("#ffffff", "#ff2d55"),
];

// ============================================
// Parameter Panel Ranges (min, max, step)
// ============================================

pub const COUNT_RANGE: (f64, f64, f64) = (100.0, 1_000_000.0, 100.0);
pub const SIZE_RANGE: (f64, f64, f64) = (0.001, 0.1, 0.001);
pub const RADIUS_RANGE: (f64, f64, f64) = (0.01, 20.0, 0.01);
pub const BRANCHES_RANGE: (f64, f64, f64) = (2.0, 20.0, 1.0);
pub const SPIN_RANGE: (f64, f64, f64) = (-5.0, 5.0, 0.001);
pub const RANDOMNESS_RANGE: (f64, f64, f64) = (0.0, 2.0, 0.001);
pub const RANDOMNESS_POWER_RANGE: (f64, f64, f64) = (1.0, 10.0, 0.001);
pub const GALAXY_Y_RANGE: (f64, f64, f64) = (5.0, 30.0, 0.1);
pub const WAVE_SPEED_RANGE: (f64, f64, f64) = (0.0, 5.0, 0.1);
pub const WAVE_HEIGHT_RANGE: (f64, f64, f64) = (0.0, 2.0, 0.1);

/// Step multiplier while Shift is held
pub const COARSE_STEP_MULTIPLIER: f64 = 10.0;

// ============================================
// Scenery Layout
// ============================================

pub const FLOOR_RADIUS: f32 = 20.0;
pub const FLOOR_COLOR: &str = "#88674E";

pub const POND_CENTER: [f32; 3] = [-10.0, 0.01, 5.0];
pub const POND_RADIUS: f32 = 4.0;
pub const POND_COLOR: &str = "#3498db";

pub const TREE_POSITIONS: [[f32; 2]; 8] = [
    [10.0, 10.0],
    [-10.0, 10.0],
    [10.0, -10.0],
    [-10.0, -10.0],
    [15.0, 0.0],
    [-15.0, 0.0],
    [0.0, 15.0],
    [0.0, -15.0],
];
pub const TRUNK_RADIUS_TOP: f32 = 0.2;
pub const TRUNK_RADIUS_BOTTOM: f32 = 0.3;
pub const TRUNK_HEIGHT: f32 = 1.5;
pub const TRUNK_CENTER_Y: f32 = 0.75;
pub const TRUNK_COLOR: &str = "#4a3320";
pub const LEAVES_RADIUS: f32 = 1.0;
pub const LEAVES_HEIGHT: f32 = 2.0;
pub const LEAVES_CENTER_Y: f32 = 2.5;
pub const LEAVES_COLOR: &str = "#2d5a27";

pub const GRASS_ATTEMPTS: usize = 1000;
pub const GRASS_SPREAD_RADIUS: f32 = 20.0;
pub const GRASS_Y: f32 = 0.25;
pub const GRASS_COLOR: &str = "#3d5e3a";
/// Minimum distance from the pond centre
pub const GRASS_POND_CLEARANCE: f32 = 5.0;
/// Minimum distance from the house at the origin
pub const GRASS_HOUSE_CLEARANCE: f32 = 4.0;

/// Marker size for scenery points (world units)
pub const SCENERY_MARKER_SIZE: f32 = 0.25;

// ============================================
// Camera
// ============================================

pub const CAMERA_START: [f32; 3] = [-8.0, 4.0, 8.0];
pub const CAMERA_FOV_Y_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
pub const CAMERA_MIN_DISTANCE: f32 = 1.0;
pub const CAMERA_MAX_DISTANCE: f32 = 80.0;
/// Fraction of angular velocity removed per update
pub const CAMERA_DAMPING: f32 = 0.05;
/// Radians per dragged pixel
pub const CAMERA_ROTATE_SPEED: f32 = 0.005;
/// Distance scale per scroll line
pub const CAMERA_ZOOM_SPEED: f32 = 0.95;

/// Background clear colour
pub const CLEAR_COLOR: [f64; 3] = [0.01, 0.01, 0.02];

/// Seed from `GALAXY_SEED`, if set to a valid u64
pub fn seed_from_env() -> Option<u64> {
    parse_seed(std::env::var(SEED_ENV_VAR).ok().as_deref())
}

fn parse_seed(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a u64", SEED_ENV_VAR, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(None), None);
        assert_eq!(parse_seed(Some("42")), Some(42));
        assert_eq!(parse_seed(Some(" 7 ")), Some(7));
        assert_eq!(parse_seed(Some("-1")), None);
        assert_eq!(parse_seed(Some("abc")), None);
    }

    #[test]
    fn test_ranges_well_formed() {
        for (min, max, step) in [
            COUNT_RANGE,
            SIZE_RANGE,
            RADIUS_RANGE,
            BRANCHES_RANGE,
            SPIN_RANGE,
            RANDOMNESS_RANGE,
            RANDOMNESS_POWER_RANGE,
            GALAXY_Y_RANGE,
            WAVE_SPEED_RANGE,
            WAVE_HEIGHT_RANGE,
        ] {
            assert!(min < max);
            assert!(step > 0.0 && step <= max - min);
        }
    }
}
