use thiserror::Error;

/// Failures reported by point-field generation and parameter edits
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalaxyError {
    /// A parameter value the generator cannot work with
    #[error("invalid {parameter}: {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    /// Backing storage for the requested point count could not be reserved
    #[error("cannot allocate storage for {count} points")]
    ResourceExhaustion { count: usize },
}

impl GalaxyError {
    pub fn configuration(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            reason: reason.into(),
        }
    }
}
