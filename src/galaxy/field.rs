use std::f32::consts::TAU;

use rand::Rng;

use crate::config::WAVE_X_FREQUENCY;
use crate::galaxy::error::GalaxyError;
use crate::galaxy::params::GenerationParameters;

/// One point of the field, as seen through `PointField::record`
#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointRecord {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub rest_position: [f32; 3],
}

/// Struct-of-arrays point storage.
///
/// All three arrays hold `3 * len()` floats. `rest_positions` and `colors`
/// are fixed at generation; only the y component of `positions` changes.
#[derive(Debug)]
pub struct PointField {
    positions: Vec<f32>,
    colors: Vec<f32>,
    rest_positions: Vec<f32>,
    generation: u64,
}

impl PointField {
    /// Build a field from `params`, drawing every random value from `rng`.
    ///
    /// Parameters are validated and storage is reserved before any point is
    /// computed, so a failure never yields a partial field.
    pub fn generate<R: Rng + ?Sized>(
        params: &GenerationParameters,
        rng: &mut R,
    ) -> Result<Self, GalaxyError> {
        params.validate()?;

        let count = params.count;
        let len = count
            .checked_mul(3)
            .ok_or(GalaxyError::ResourceExhaustion { count })?;
        let mut positions = try_alloc(len, count)?;
        let mut colors = try_alloc(len, count)?;
        let mut rest_positions = try_alloc(len, count)?;

        let branches = params.branches as usize;
        for i in 0..count {
            let radius = rng.gen::<f32>() * params.radius;
            let spin_angle = radius * params.spin;
            let branch_angle = (i % branches) as f32 / branches as f32 * TAU;

            let offset_x = random_offset(rng, params);
            let offset_y = random_offset(rng, params);
            let offset_z = random_offset(rng, params);

            let angle = branch_angle + spin_angle;
            positions.extend_from_slice(&[
                angle.cos() * radius + offset_x,
                params.galaxy_y + offset_y,
                angle.sin() * radius + offset_z,
            ]);

            let color = params
                .inside_color
                .lerp(params.outside_color, radius / params.radius);
            colors.extend_from_slice(&color.to_array());
        }

        rest_positions.extend_from_slice(&positions);

        Ok(Self {
            positions,
            colors,
            rest_positions,
            generation: 0,
        })
    }

    /// Recompute every live y from its rest position and the elapsed time.
    ///
    /// x, z and colours are never touched, so repeated calls with the same
    /// inputs leave the field unchanged.
    pub fn animate(&mut self, elapsed_seconds: f64, params: &GenerationParameters) {
        // Reduce the time phase in f64 so long sessions keep f32 precision
        let phase = (elapsed_seconds * params.wave_speed as f64)
            .rem_euclid(std::f64::consts::TAU) as f32;
        let height = params.wave_height;

        for (live, rest) in self
            .positions
            .chunks_exact_mut(3)
            .zip(self.rest_positions.chunks_exact(3))
        {
            live[1] = rest[1] + (phase + rest[0] * WAVE_X_FREQUENCY).sin() * height;
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    #[cfg(test)]
    pub fn record(&self, index: usize) -> Option<PointRecord> {
        if index >= self.len() {
            return None;
        }
        let i3 = index * 3;
        Some(PointRecord {
            position: triple(&self.positions, i3),
            color: triple(&self.colors, i3),
            rest_position: triple(&self.rest_positions, i3),
        })
    }

    #[cfg(test)]
    pub fn records(&self) -> impl Iterator<Item = PointRecord> + '_ {
        (0..self.len()).filter_map(move |i| self.record(i))
    }

    /// Live positions, xyz interleaved
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Linear RGB colours, rgb interleaved
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[cfg(test)]
    pub fn rest_positions(&self) -> &[f32] {
        &self.rest_positions
    }

    /// Id stamped by the owning generator; 0 for a field built directly
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }
}

/// `sign * U^power * randomness`, drawing magnitude before sign
fn random_offset<R: Rng + ?Sized>(rng: &mut R, params: &GenerationParameters) -> f32 {
    let magnitude = rng.gen::<f32>().powf(params.randomness_power);
    let sign = if rng.gen::<f32>() < 0.5 { 1.0 } else { -1.0 };
    sign * magnitude * params.randomness
}

fn try_alloc(len: usize, count: usize) -> Result<Vec<f32>, GalaxyError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| GalaxyError::ResourceExhaustion { count })?;
    Ok(buffer)
}

#[cfg(test)]
fn triple(data: &[f32], i3: usize) -> [f32; 3] {
    [data[i3], data[i3 + 1], data[i3 + 2]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::color::Rgb;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// RNG whose every f32 draw is 0.0
    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    /// RNG whose every f32 draw is exactly 0.5
    fn half_rng() -> StepRng {
        StepRng::new(1 << 31, 0)
    }

    fn small_params() -> GenerationParameters {
        GenerationParameters {
            count: 3,
            radius: 10.0,
            branches: 3,
            spin: 0.0,
            randomness: 0.0,
            randomness_power: 1.0,
            galaxy_y: 10.0,
            inside_color: Rgb::from_hex("#ff6030").unwrap(),
            outside_color: Rgb::from_hex("#1b3984").unwrap(),
            ..GenerationParameters::default()
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "expected {} to be close to {}", a, b);
    }

    #[test]
    fn test_count_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [1, 3, 100, 5000] {
            let params = GenerationParameters {
                count,
                ..GenerationParameters::default()
            };
            let field = PointField::generate(&params, &mut rng).unwrap();
            assert_eq!(field.len(), count);
            assert_eq!(field.positions().len(), 3 * count);
            assert_eq!(field.colors().len(), 3 * count);
            assert_eq!(field.rest_positions().len(), 3 * count);
        }
    }

    #[test]
    fn test_degenerate_rng_example() {
        let params = small_params();
        let field = PointField::generate(&params, &mut zero_rng()).unwrap();

        let first = field.record(0).unwrap();
        assert_eq!(first.rest_position, [0.0, 10.0, 0.0]);
        assert_eq!(first.position, first.rest_position);
        assert_eq!(first.color, params.inside_color.to_array());

        for record in field.records() {
            assert_eq!(record.rest_position, [0.0, 10.0, 0.0]);
        }
    }

    #[test]
    fn test_branches_spread_evenly() {
        let params = small_params();
        let field = PointField::generate(&params, &mut half_rng()).unwrap();

        for (i, record) in field.records().enumerate() {
            let angle = i as f32 / 3.0 * TAU;
            assert_close(record.rest_position[0], angle.cos() * 5.0);
            assert_close(record.rest_position[1], 10.0);
            assert_close(record.rest_position[2], angle.sin() * 5.0);

            let mid = params.inside_color.lerp(params.outside_color, 0.5);
            assert_eq!(record.color, mid.to_array());
        }
    }

    #[test]
    fn test_randomness_scales_offsets() {
        let params = GenerationParameters {
            count: 1,
            randomness: 2.0,
            ..small_params()
        };
        // Every draw is 0.5: magnitude 0.5, sign negative, scaled by 2
        let field = PointField::generate(&params, &mut half_rng()).unwrap();
        let rest = field.record(0).unwrap().rest_position;
        assert_close(rest[0], 5.0 - 1.0);
        assert_close(rest[1], 10.0 - 1.0);
        assert_close(rest[2], -1.0);
    }

    #[test]
    fn test_offsets_bounded_by_randomness() {
        let params = GenerationParameters {
            count: 2000,
            spin: 0.0,
            randomness: 0.3,
            ..GenerationParameters::default()
        };
        let field = PointField::generate(&params, &mut StdRng::seed_from_u64(11)).unwrap();
        for record in field.records() {
            let dy = record.rest_position[1] - params.galaxy_y;
            assert!(dy.abs() <= params.randomness + 1e-5, "offset {} too large", dy);
        }
    }

    #[test]
    fn test_colors_on_gradient() {
        let params = GenerationParameters {
            count: 2000,
            randomness: 0.0,
            ..GenerationParameters::default()
        };
        let field = PointField::generate(&params, &mut StdRng::seed_from_u64(3)).unwrap();

        for record in field.records() {
            let [x, _, z] = record.rest_position;
            let t = (x * x + z * z).sqrt() / params.radius;
            assert!((0.0..=1.0 + 1e-5).contains(&t));

            let expected = params.inside_color.lerp(params.outside_color, t).to_array();
            for (got, want) in record.color.iter().zip(expected) {
                assert!((got - want).abs() < 1e-3, "colour {} off gradient ({})", got, want);
            }
        }
    }

    #[test]
    fn test_seeded_generation_reproducible() {
        let params = GenerationParameters {
            count: 500,
            ..GenerationParameters::default()
        };
        let a = PointField::generate(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = PointField::generate(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = small_params();
        params.count = 0;
        assert!(matches!(
            PointField::generate(&params, &mut zero_rng()),
            Err(GalaxyError::Configuration { parameter: "count", .. })
        ));

        let mut params = small_params();
        params.radius = 0.0;
        assert!(matches!(
            PointField::generate(&params, &mut zero_rng()),
            Err(GalaxyError::Configuration { parameter: "radius", .. })
        ));
    }

    #[test]
    fn test_overflowing_count_is_exhaustion() {
        let mut params = small_params();
        params.count = usize::MAX;
        assert_eq!(
            PointField::generate(&params, &mut zero_rng()).unwrap_err(),
            GalaxyError::ResourceExhaustion { count: usize::MAX }
        );
    }

    /// Counts every draw so tests can prove nothing was sampled
    struct CountingRng {
        inner: StepRng,
        draws: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    #[test]
    fn test_unallocatable_count_fails_before_sampling() {
        let mut params = small_params();
        // 3 * count fits in usize, but the byte size cannot be reserved
        params.count = usize::MAX / 3;
        let mut rng = CountingRng {
            inner: zero_rng(),
            draws: 0,
        };
        assert_eq!(
            PointField::generate(&params, &mut rng).unwrap_err(),
            GalaxyError::ResourceExhaustion { count: usize::MAX / 3 }
        );
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn test_animate_at_time_zero() {
        let params = GenerationParameters {
            count: 1000,
            wave_height: 0.7,
            ..GenerationParameters::default()
        };
        let mut field = PointField::generate(&params, &mut StdRng::seed_from_u64(5)).unwrap();
        field.animate(0.0, &params);

        for record in field.records() {
            let rest = record.rest_position;
            let expected = rest[1] + (rest[0] * 0.1).sin() * params.wave_height;
            assert_close(record.position[1], expected);
        }
    }

    #[test]
    fn test_animate_only_moves_y() {
        let params = GenerationParameters {
            count: 500,
            wave_height: 1.5,
            ..GenerationParameters::default()
        };
        let mut field = PointField::generate(&params, &mut StdRng::seed_from_u64(8)).unwrap();
        let colors_before = field.colors().to_vec();
        let rest_before = field.rest_positions().to_vec();

        field.animate(3.25, &params);

        assert_eq!(field.colors(), colors_before.as_slice());
        assert_eq!(field.rest_positions(), rest_before.as_slice());
        for record in field.records() {
            assert_eq!(record.position[0], record.rest_position[0]);
            assert_eq!(record.position[2], record.rest_position[2]);
            let dy = record.position[1] - record.rest_position[1];
            assert!(dy.abs() <= params.wave_height + 1e-5);
        }
    }

    #[test]
    fn test_animate_idempotent() {
        let params = GenerationParameters {
            count: 500,
            ..GenerationParameters::default()
        };
        let mut field = PointField::generate(&params, &mut StdRng::seed_from_u64(2)).unwrap();

        field.animate(12.5, &params);
        let first = field.positions().to_vec();
        field.animate(12.5, &params);
        assert_eq!(field.positions(), first.as_slice());

        // Going back in time restores the same state too
        field.animate(1.0, &params);
        field.animate(12.5, &params);
        assert_eq!(field.positions(), first.as_slice());
    }

    #[test]
    fn test_zero_wave_height_is_rest() {
        let params = GenerationParameters {
            count: 200,
            wave_height: 0.0,
            ..GenerationParameters::default()
        };
        let mut field = PointField::generate(&params, &mut StdRng::seed_from_u64(4)).unwrap();
        field.animate(42.0, &params);
        assert_eq!(field.positions(), field.rest_positions());
    }

    #[test]
    fn test_long_running_phase_stays_exact() {
        let params = GenerationParameters {
            count: 50,
            wave_speed: 5.0,
            wave_height: 2.0,
            ..GenerationParameters::default()
        };
        let mut field = PointField::generate(&params, &mut StdRng::seed_from_u64(6)).unwrap();
        // One day of wall-clock time wraps the phase tens of thousands of times
        let elapsed = 86_400.0;
        field.animate(elapsed, &params);

        for record in field.records() {
            let rest = record.rest_position;
            let angle = elapsed * params.wave_speed as f64 + rest[0] as f64 * 0.1;
            let expected = rest[1] as f64 + angle.sin() * params.wave_height as f64;
            let err = (record.position[1] as f64 - expected).abs();
            assert!(err < 1e-4, "drifted by {}", err);
        }
    }

    #[test]
    fn test_record_out_of_range() {
        let field = PointField::generate(&small_params(), &mut zero_rng()).unwrap();
        assert!(field.record(3).is_none());
        assert_eq!(field.generation(), 0);
    }
}
