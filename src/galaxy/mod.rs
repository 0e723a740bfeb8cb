mod color;
mod error;
mod field;
mod generator;
mod params;

pub use color::{ColorParseError, Rgb};
pub use error::GalaxyError;
pub use field::PointField;
pub use generator::{GalaxyGenerator, PointCloudTarget};
pub use params::{GenerationParameters, ParameterChange, ParameterKey};
