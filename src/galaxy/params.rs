use crate::config::{
    BRANCHES_RANGE, COUNT_RANGE, DEFAULT_BRANCHES, DEFAULT_COUNT, DEFAULT_GALAXY_Y,
    DEFAULT_INSIDE_COLOR, DEFAULT_OUTSIDE_COLOR, DEFAULT_RADIUS, DEFAULT_RANDOMNESS,
    DEFAULT_RANDOMNESS_POWER, DEFAULT_SIZE, DEFAULT_SPIN, DEFAULT_WAVE_HEIGHT,
    DEFAULT_WAVE_SPEED, GALAXY_Y_RANGE, RADIUS_RANGE, RANDOMNESS_POWER_RANGE, RANDOMNESS_RANGE,
    SIZE_RANGE, SPIN_RANGE, WAVE_HEIGHT_RANGE, WAVE_SPEED_RANGE,
};
use crate::galaxy::color::Rgb;
use crate::galaxy::error::GalaxyError;

/// Everything that shapes a point field and its wave animation
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParameters {
    pub count: usize,
    /// Point diameter in world units; consumed by the renderer only
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    /// Scale applied to every random positional offset
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
    pub wave_speed: f32,
    pub wave_height: f32,
    /// Vertical offset of the galaxy plane
    pub galaxy_y: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            size: DEFAULT_SIZE,
            radius: DEFAULT_RADIUS,
            branches: DEFAULT_BRANCHES,
            spin: DEFAULT_SPIN,
            randomness: DEFAULT_RANDOMNESS,
            randomness_power: DEFAULT_RANDOMNESS_POWER,
            // Checked by test_defaults_are_valid
            inside_color: Rgb::from_hex(DEFAULT_INSIDE_COLOR).unwrap_or(Rgb::new(1.0, 0.3, 0.1)),
            outside_color: Rgb::from_hex(DEFAULT_OUTSIDE_COLOR).unwrap_or(Rgb::new(0.0, 0.05, 0.2)),
            wave_speed: DEFAULT_WAVE_SPEED,
            wave_height: DEFAULT_WAVE_HEIGHT,
            galaxy_y: DEFAULT_GALAXY_Y,
        }
    }
}

/// Independently settable parameters exposed by the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    Count,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    RandomnessPower,
    GalaxyY,
    InsideColor,
    OutsideColor,
    WaveSpeed,
    WaveHeight,
}

/// Slider constraints for a numeric parameter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    const fn from_tuple((min, max, step): (f64, f64, f64)) -> Self {
        Self { min, max, step }
    }

    /// Snap to the nearest step multiple, then clamp into [min, max]
    pub fn constrain(&self, value: f64) -> f64 {
        let snapped = (value / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }
}

/// What a successful parameter edit requires of the owner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterChange {
    /// The point field must be rebuilt
    Regenerate,
    /// Only the next animation tick is affected
    AnimationOnly,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 12] = [
        ParameterKey::Count,
        ParameterKey::Size,
        ParameterKey::Radius,
        ParameterKey::Branches,
        ParameterKey::Spin,
        ParameterKey::Randomness,
        ParameterKey::RandomnessPower,
        ParameterKey::GalaxyY,
        ParameterKey::InsideColor,
        ParameterKey::OutsideColor,
        ParameterKey::WaveSpeed,
        ParameterKey::WaveHeight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParameterKey::Count => "count",
            ParameterKey::Size => "size",
            ParameterKey::Radius => "radius",
            ParameterKey::Branches => "branches",
            ParameterKey::Spin => "spin",
            ParameterKey::Randomness => "randomness",
            ParameterKey::RandomnessPower => "randomnessPower",
            ParameterKey::GalaxyY => "galaxyY",
            ParameterKey::InsideColor => "insideColor",
            ParameterKey::OutsideColor => "outsideColor",
            ParameterKey::WaveSpeed => "waveSpeed",
            ParameterKey::WaveHeight => "waveHeight",
        }
    }

    /// Slider range, or None for colour parameters
    pub fn range(&self) -> Option<ParamRange> {
        let tuple = match self {
            ParameterKey::Count => COUNT_RANGE,
            ParameterKey::Size => SIZE_RANGE,
            ParameterKey::Radius => RADIUS_RANGE,
            ParameterKey::Branches => BRANCHES_RANGE,
            ParameterKey::Spin => SPIN_RANGE,
            ParameterKey::Randomness => RANDOMNESS_RANGE,
            ParameterKey::RandomnessPower => RANDOMNESS_POWER_RANGE,
            ParameterKey::GalaxyY => GALAXY_Y_RANGE,
            ParameterKey::WaveSpeed => WAVE_SPEED_RANGE,
            ParameterKey::WaveHeight => WAVE_HEIGHT_RANGE,
            ParameterKey::InsideColor | ParameterKey::OutsideColor => return None,
        };
        Some(ParamRange::from_tuple(tuple))
    }

    pub fn is_color(&self) -> bool {
        matches!(self, ParameterKey::InsideColor | ParameterKey::OutsideColor)
    }

    /// Wave parameters are read directly by `animate`; everything else rebuilds the field
    pub fn triggers_regeneration(&self) -> bool {
        !matches!(self, ParameterKey::WaveSpeed | ParameterKey::WaveHeight)
    }

    fn change(&self) -> ParameterChange {
        if self.triggers_regeneration() {
            ParameterChange::Regenerate
        } else {
            ParameterChange::AnimationOnly
        }
    }

    /// Next key in panel order, wrapping around
    pub fn next(&self) -> ParameterKey {
        let index = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Previous key in panel order, wrapping around
    pub fn previous(&self) -> ParameterKey {
        let index = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl GenerationParameters {
    /// Reject values that would make generation undefined
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.count == 0 {
            return Err(GalaxyError::configuration("count", "must be greater than zero"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GalaxyError::configuration(
                "radius",
                format!("must be a finite value greater than zero, got {}", self.radius),
            ));
        }
        if self.branches == 0 {
            return Err(GalaxyError::configuration("branches", "must be at least 1"));
        }
        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(GalaxyError::configuration(
                "randomness",
                format!("must be finite and non-negative, got {}", self.randomness),
            ));
        }
        if !self.randomness_power.is_finite() || self.randomness_power < 1.0 {
            return Err(GalaxyError::configuration(
                "randomnessPower",
                format!("must be finite and at least 1, got {}", self.randomness_power),
            ));
        }
        if !self.wave_height.is_finite() || self.wave_height < 0.0 {
            return Err(GalaxyError::configuration(
                "waveHeight",
                format!("must be finite and non-negative, got {}", self.wave_height),
            ));
        }
        for (name, value) in [
            ("spin", self.spin),
            ("galaxyY", self.galaxy_y),
            ("size", self.size),
            ("waveSpeed", self.wave_speed),
        ] {
            if !value.is_finite() {
                return Err(GalaxyError::configuration(name, "must be finite"));
            }
        }
        Ok(())
    }

    /// Current numeric value of a parameter, or None for colours
    pub fn get(&self, key: ParameterKey) -> Option<f64> {
        let value = match key {
            ParameterKey::Count => self.count as f64,
            ParameterKey::Size => self.size as f64,
            ParameterKey::Radius => self.radius as f64,
            ParameterKey::Branches => self.branches as f64,
            ParameterKey::Spin => self.spin as f64,
            ParameterKey::Randomness => self.randomness as f64,
            ParameterKey::RandomnessPower => self.randomness_power as f64,
            ParameterKey::GalaxyY => self.galaxy_y as f64,
            ParameterKey::WaveSpeed => self.wave_speed as f64,
            ParameterKey::WaveHeight => self.wave_height as f64,
            ParameterKey::InsideColor | ParameterKey::OutsideColor => return None,
        };
        Some(value)
    }

    /// Set a numeric parameter the way a slider would: snap to step, clamp to range.
    ///
    /// `count` and `branches` must be non-negative integers; anything else is a
    /// configuration error and leaves the parameters unchanged.
    pub fn set(&mut self, key: ParameterKey, value: f64) -> Result<ParameterChange, GalaxyError> {
        let (slot, range) = match key {
            ParameterKey::Size => (&mut self.size, SIZE_RANGE),
            ParameterKey::Radius => (&mut self.radius, RADIUS_RANGE),
            ParameterKey::Spin => (&mut self.spin, SPIN_RANGE),
            ParameterKey::Randomness => (&mut self.randomness, RANDOMNESS_RANGE),
            ParameterKey::RandomnessPower => (&mut self.randomness_power, RANDOMNESS_POWER_RANGE),
            ParameterKey::GalaxyY => (&mut self.galaxy_y, GALAXY_Y_RANGE),
            ParameterKey::WaveSpeed => (&mut self.wave_speed, WAVE_SPEED_RANGE),
            ParameterKey::WaveHeight => (&mut self.wave_height, WAVE_HEIGHT_RANGE),
            ParameterKey::Count => return self.set_integer(key, value, COUNT_RANGE),
            ParameterKey::Branches => return self.set_integer(key, value, BRANCHES_RANGE),
            ParameterKey::InsideColor | ParameterKey::OutsideColor => {
                return Err(GalaxyError::configuration(
                    key.name(),
                    "colour parameters take a hex string",
                ));
            }
        };
        if !value.is_finite() {
            return Err(GalaxyError::configuration(key.name(), "must be finite"));
        }
        *slot = ParamRange::from_tuple(range).constrain(value) as f32;
        Ok(key.change())
    }

    /// `count` and `branches`: whole, non-negative slider values only
    fn set_integer(
        &mut self,
        key: ParameterKey,
        value: f64,
        range: (f64, f64, f64),
    ) -> Result<ParameterChange, GalaxyError> {
        if !value.is_finite() {
            return Err(GalaxyError::configuration(key.name(), "must be finite"));
        }
        if value < 0.0 || value.fract() != 0.0 {
            return Err(GalaxyError::configuration(
                key.name(),
                format!("must be a non-negative integer, got {}", value),
            ));
        }

        let value = ParamRange::from_tuple(range).constrain(value).round();
        if key == ParameterKey::Count {
            self.count = value as usize;
        } else {
            self.branches = value as u32;
        }
        Ok(key.change())
    }

    /// Set one of the two gradient colours from a hex string
    pub fn set_color(&mut self, key: ParameterKey, hex: &str) -> Result<ParameterChange, GalaxyError> {
        let color = Rgb::from_hex(hex)
            .map_err(|e| GalaxyError::configuration(key.name(), e.to_string()))?;
        match key {
            ParameterKey::InsideColor => self.inside_color = color,
            ParameterKey::OutsideColor => self.outside_color = color,
            _ => {
                return Err(GalaxyError::configuration(key.name(), "is not a colour parameter"));
            }
        }
        Ok(key.change())
    }
}
