use rand::Rng;

use crate::galaxy::error::GalaxyError;
use crate::galaxy::field::PointField;
use crate::galaxy::params::{GenerationParameters, ParameterChange, ParameterKey};

/// Renderable handle a point field is attached to
pub trait PointCloudTarget {
    /// Take ownership of GPU-side copies of a freshly generated field
    fn attach(&mut self, field: &PointField, params: &GenerationParameters);

    /// Release everything built for the previous field
    fn detach(&mut self);

    /// Push animated positions after a tick
    fn update_positions(&mut self, field: &PointField);
}

/// Owns the single live point field and the RNG stream that feeds it
pub struct GalaxyGenerator<R: Rng> {
    params: GenerationParameters,
    rng: R,
    field: Option<PointField>,
    generation: u64,
}

impl<R: Rng> GalaxyGenerator<R> {
    pub fn new(params: GenerationParameters, rng: R) -> Self {
        Self {
            params,
            rng,
            field: None,
            generation: 0,
        }
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn field(&self) -> Option<&PointField> {
        self.field.as_ref()
    }

    /// Replace the RNG stream used by subsequent generations
    pub fn reseed(&mut self, rng: R) {
        self.rng = rng;
    }

    /// Build a new field and swap it in.
    ///
    /// On error the previous field stays attached and untouched. On success
    /// the old field is detached and dropped before the new one is attached.
    pub fn regenerate<T: PointCloudTarget + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> Result<&PointField, GalaxyError> {
        let mut field = PointField::generate(&self.params, &mut self.rng)?;
        self.generation += 1;
        field.set_generation(self.generation);

        if self.field.take().is_some() {
            target.detach();
        }
        target.attach(&field, &self.params);
        log::info!(
            "Generated galaxy #{}: {} points, {} branches, radius {:.2}",
            self.generation,
            field.len(),
            self.params.branches,
            self.params.radius
        );

        let field: &PointField = self.field.insert(field);
        Ok(field)
    }

    /// Animate the live field for this frame and push the result to the target
    pub fn tick<T: PointCloudTarget + ?Sized>(&mut self, elapsed_seconds: f64, target: &mut T) {
        if let Some(field) = self.field.as_mut() {
            field.animate(elapsed_seconds, &self.params);
            target.update_positions(field);
        }
    }

    /// Edit a numeric parameter, regenerating when the parameter shapes the field.
    ///
    /// A rejected edit or a failed regeneration restores the previous parameters.
    pub fn apply<T: PointCloudTarget + ?Sized>(
        &mut self,
        key: ParameterKey,
        value: f64,
        target: &mut T,
    ) -> Result<ParameterChange, GalaxyError> {
        let previous = self.params.clone();
        let change = self.params.set(key, value)?;
        self.commit(change, previous, target)
    }

    /// Edit one of the gradient colours from a hex string
    pub fn apply_color<T: PointCloudTarget + ?Sized>(
        &mut self,
        key: ParameterKey,
        hex: &str,
        target: &mut T,
    ) -> Result<ParameterChange, GalaxyError> {
        let previous = self.params.clone();
        let change = self.params.set_color(key, hex)?;
        self.commit(change, previous, target)
    }

    /// Swap both gradient colours at once with a single regeneration
    pub fn apply_palette<T: PointCloudTarget + ?Sized>(
        &mut self,
        inside: &str,
        outside: &str,
        target: &mut T,
    ) -> Result<ParameterChange, GalaxyError> {
        let previous = self.params.clone();
        if let Err(e) = self
            .params
            .set_color(ParameterKey::InsideColor, inside)
            .and_then(|_| self.params.set_color(ParameterKey::OutsideColor, outside))
        {
            self.params = previous;
            return Err(e);
        }
        self.commit(ParameterChange::Regenerate, previous, target)
    }

    /// Restore default parameters and rebuild the field
    pub fn reset<T: PointCloudTarget + ?Sized>(&mut self, target: &mut T) -> Result<(), GalaxyError> {
        let previous = std::mem::take(&mut self.params);
        self.commit(ParameterChange::Regenerate, previous, target)?;
        Ok(())
    }

    fn commit<T: PointCloudTarget + ?Sized>(
        &mut self,
        change: ParameterChange,
        previous: GenerationParameters,
        target: &mut T,
    ) -> Result<ParameterChange, GalaxyError> {
        if change == ParameterChange::Regenerate {
            if let Err(e) = self.regenerate(target) {
                self.params = previous;
                return Err(e);
            }
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::color::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, PartialEq)]
    enum Event {
        Attach { generation: u64, len: usize },
        Detach,
        Update { generation: u64 },
    }

    /// Records calls and tracks how many fields are attached at once
    #[derive(Default)]
    struct RecordingTarget {
        events: Vec<Event>,
        attached: usize,
        max_attached: usize,
    }

    impl PointCloudTarget for RecordingTarget {
        fn attach(&mut self, field: &PointField, _params: &GenerationParameters) {
            self.attached += 1;
            self.max_attached = self.max_attached.max(self.attached);
            self.events.push(Event::Attach {
                generation: field.generation(),
                len: field.len(),
            });
        }

        fn detach(&mut self) {
            self.attached -= 1;
            self.events.push(Event::Detach);
        }

        fn update_positions(&mut self, field: &PointField) {
            self.events.push(Event::Update {
                generation: field.generation(),
            });
        }
    }

    fn generator() -> GalaxyGenerator<StdRng> {
        let params = GenerationParameters {
            count: 300,
            ..GenerationParameters::default()
        };
        GalaxyGenerator::new(params, StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_regenerate_replaces_field() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();

        let first = generator.regenerate(&mut target).unwrap().positions().to_vec();
        let second_generation = generator.regenerate(&mut target).unwrap().generation();

        assert_eq!(second_generation, 2);
        let live = generator.field().unwrap();
        assert_eq!(live.generation(), 2);
        assert_ne!(live.positions(), first.as_slice());
        assert_eq!(
            target.events,
            vec![
                Event::Attach { generation: 1, len: 300 },
                Event::Detach,
                Event::Attach { generation: 2, len: 300 },
            ]
        );
        assert_eq!(target.max_attached, 1);
        assert_eq!(target.attached, 1);
    }

    #[test]
    fn test_failed_regeneration_keeps_previous() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.regenerate(&mut target).unwrap();

        generator.params.radius = 0.0;
        let err = generator.regenerate(&mut target).unwrap_err();
        assert!(matches!(err, GalaxyError::Configuration { parameter: "radius", .. }));

        assert_eq!(generator.field().unwrap().generation(), 1);
        assert_eq!(target.events.len(), 1);
        assert_eq!(target.attached, 1);
    }

    #[test]
    fn test_tick_animates_live_field() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();

        // Nothing to animate yet
        generator.tick(1.0, &mut target);
        assert!(target.events.is_empty());

        generator.regenerate(&mut target).unwrap();
        generator.tick(1.0, &mut target);
        assert_eq!(target.events.last(), Some(&Event::Update { generation: 1 }));

        let field = generator.field().unwrap();
        let record = field.record(0).unwrap();
        let params = generator.params();
        let expected = record.rest_position[1]
            + (params.wave_speed + record.rest_position[0] * 0.1).sin() * params.wave_height;
        assert!((record.position[1] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_wave_edit_does_not_regenerate() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.regenerate(&mut target).unwrap();

        let change = generator.apply(ParameterKey::WaveHeight, 1.0, &mut target).unwrap();
        assert_eq!(change, ParameterChange::AnimationOnly);
        assert_eq!(generator.field().unwrap().generation(), 1);
        assert_eq!(generator.params().wave_height, 1.0);
    }

    #[test]
    fn test_shape_edit_regenerates() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.regenerate(&mut target).unwrap();

        generator.apply(ParameterKey::Count, 500.0, &mut target).unwrap();
        assert_eq!(generator.field().unwrap().len(), 500);
        assert_eq!(generator.field().unwrap().generation(), 2);

        generator
            .apply_color(ParameterKey::InsideColor, "#00ff00", &mut target)
            .unwrap();
        assert_eq!(generator.field().unwrap().generation(), 3);
        assert_eq!(target.max_attached, 1);
    }

    #[test]
    fn test_rejected_edit_leaves_state() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.regenerate(&mut target).unwrap();
        let before = generator.params().clone();

        assert!(generator.apply(ParameterKey::Count, 99.5, &mut target).is_err());
        assert!(generator
            .apply_color(ParameterKey::OutsideColor, "#zzz", &mut target)
            .is_err());
        assert_eq!(generator.params(), &before);
        assert_eq!(generator.field().unwrap().generation(), 1);
    }

    #[test]
    fn test_palette_regenerates_once() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.regenerate(&mut target).unwrap();

        generator
            .apply_palette("#ffffff", "#000000", &mut target)
            .unwrap();
        assert_eq!(generator.field().unwrap().generation(), 2);
        assert_eq!(generator.params().outside_color, Rgb::new(0.0, 0.0, 0.0));

        // Half-applied palettes are rolled back
        let before = generator.params().clone();
        assert!(generator.apply_palette("#ff0000", "nope", &mut target).is_err());
        assert_eq!(generator.params(), &before);
        assert_eq!(generator.field().unwrap().generation(), 2);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut generator = generator();
        let mut target = RecordingTarget::default();
        generator.apply(ParameterKey::Count, 400.0, &mut target).unwrap();

        generator.reset(&mut target).unwrap();
        assert_eq!(generator.params(), &GenerationParameters::default());
        assert_eq!(
            generator.field().unwrap().len(),
            GenerationParameters::default().count
        );
    }
}
