mod buffers;
mod context;
mod render;

pub use buffers::{CameraBuffer, CameraUniform, GpuPointTarget, PointCloudBuffers, PointCloudSlot};
pub use context::{GpuContext, GpuError};
pub use render::{begin_frame, PointBlend, PointPipeline};
