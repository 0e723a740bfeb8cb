use wgpu::util::DeviceExt;
use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::camera::OrbitCamera;
use crate::galaxy::{GenerationParameters, PointCloudTarget, PointField};

/// Camera and point-size uniform (144 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Point diameter in world units
    pub point_size: f32,
    /// 1 / projection[1][1]; makes on-screen size `size * (height / 2) / depth`
    pub point_scale: f32,
    /// Surface height in pixels, for the one-pixel minimum point size
    pub viewport_height: f32,
    pub _padding: f32,
}

impl CameraUniform {
    pub fn new(camera: &OrbitCamera, point_size: f32, viewport_height: u32) -> Self {
        let projection = camera.projection();
        Self {
            view: camera.view().to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            point_size,
            point_scale: 1.0 / projection.y_axis.y,
            viewport_height: viewport_height.max(1) as f32,
            _padding: 0.0,
        }
    }
}

/// Uniform buffer holding one `CameraUniform`
pub struct CameraBuffer {
    pub buffer: Buffer,
}

impl CameraBuffer {
    pub fn new(device: &Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    pub fn write(&self, queue: &Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// Per-instance position and colour vertex buffers for one point cloud
pub struct PointCloudBuffers {
    pub position_buffer: Buffer,
    pub color_buffer: Buffer,
    pub count: u32,
}

impl PointCloudBuffers {
    /// Upload interleaved xyz positions and rgb colours
    pub fn new(device: &Device, label: &str, positions: &[f32], colors: &[f32]) -> Self {
        assert_eq!(
            positions.len(),
            colors.len(),
            "Position and colour arrays must match"
        );

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}-positions", label)),
            contents: bytemuck::cast_slice(positions),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        });

        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}-colors", label)),
            contents: bytemuck::cast_slice(colors),
            usage: BufferUsages::VERTEX,
        });

        Self {
            position_buffer,
            color_buffer,
            count: (positions.len() / 3) as u32,
        }
    }

    /// Overwrite positions in place; the length must match the original upload
    pub fn write_positions(&self, queue: &Queue, positions: &[f32]) {
        queue.write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(positions));
    }

    /// Free GPU memory now rather than when the last reference drops
    pub fn destroy(self) {
        self.position_buffer.destroy();
        self.color_buffer.destroy();
    }
}

/// Holds the GPU copy of the live galaxy, if any
#[derive(Default)]
pub struct PointCloudSlot {
    buffers: Option<PointCloudBuffers>,
    point_size: f32,
}

impl PointCloudSlot {
    pub fn buffers(&self) -> Option<&PointCloudBuffers> {
        self.buffers.as_ref()
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Borrow the slot together with the device and queue it uploads through
    pub fn target<'a>(&'a mut self, device: &'a Device, queue: &'a Queue) -> GpuPointTarget<'a> {
        GpuPointTarget {
            device,
            queue,
            slot: self,
        }
    }
}

/// `PointCloudTarget` backed by wgpu buffers
pub struct GpuPointTarget<'a> {
    device: &'a Device,
    queue: &'a Queue,
    slot: &'a mut PointCloudSlot,
}

impl PointCloudTarget for GpuPointTarget<'_> {
    fn attach(&mut self, field: &PointField, params: &GenerationParameters) {
        if let Some(stale) = self.slot.buffers.take() {
            log::warn!("Attaching over a field that was never detached");
            stale.destroy();
        }
        self.slot.buffers = Some(PointCloudBuffers::new(
            self.device,
            "galaxy",
            field.positions(),
            field.colors(),
        ));
        self.slot.point_size = params.size;
    }

    fn detach(&mut self) {
        if let Some(buffers) = self.slot.buffers.take() {
            buffers.destroy();
        }
    }

    fn update_positions(&mut self, field: &PointField) {
        if let Some(buffers) = &self.slot.buffers {
            buffers.write_positions(self.queue, field.positions());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
    }

    #[test]
    fn test_point_scale_matches_fov() {
        let camera = OrbitCamera::default();
        let uniform = CameraUniform::new(&camera, 0.02, 0);
        let half_fov = crate::config::CAMERA_FOV_Y_DEGREES.to_radians() / 2.0;
        assert!((uniform.point_scale - half_fov.tan()).abs() < 1e-5);
        assert_eq!(uniform.point_size, 0.02);
        assert_eq!(uniform.viewport_height, 1.0);
    }
}
