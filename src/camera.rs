use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::config::{
    CAMERA_DAMPING, CAMERA_FAR, CAMERA_FOV_Y_DEGREES, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE,
    CAMERA_NEAR, CAMERA_ROTATE_SPEED, CAMERA_START, CAMERA_ZOOM_SPEED,
};

/// Keeps the camera off the poles where look_at degenerates
const POLAR_EPSILON: f32 = 1e-4;

/// Damped orbit camera circling a target point.
///
/// Angles follow the usual spherical convention: `polar` is measured from +Y,
/// `azimuth` around Y starting at +Z.
pub struct OrbitCamera {
    pub target: Vec3,
    distance: f32,
    azimuth: f32,
    polar: f32,
    azimuth_velocity: f32,
    polar_velocity: f32,
    aspect: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        let offset = eye - target;
        let distance = offset.length().clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        let polar = (offset.y / offset.length().max(f32::EPSILON)).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        Self {
            target,
            distance,
            azimuth,
            polar: polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
            azimuth_velocity: 0.0,
            polar_velocity: 0.0,
            aspect,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + Vec3::new(
                self.distance * sin_polar * self.azimuth.sin(),
                self.distance * self.polar.cos(),
                self.distance * sin_polar * self.azimuth.cos(),
            )
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Queue a rotation from a mouse drag, in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth_velocity -= dx * CAMERA_ROTATE_SPEED;
        self.polar_velocity -= dy * CAMERA_ROTATE_SPEED;
    }

    /// Positive lines move closer
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * CAMERA_ZOOM_SPEED.powf(lines))
            .clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }

    /// Apply a damped share of the pending rotation, then decay what is left.
    ///
    /// The shares form a geometric series, so the total turn equals the drag.
    pub fn update(&mut self) {
        self.azimuth += self.azimuth_velocity * CAMERA_DAMPING;
        self.polar = (self.polar + self.polar_velocity * CAMERA_DAMPING)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        self.azimuth_velocity *= 1.0 - CAMERA_DAMPING;
        self.polar_velocity *= 1.0 - CAMERA_DAMPING;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            CAMERA_FOV_Y_DEGREES.to_radians(),
            self.aspect,
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::from_array(CAMERA_START), Vec3::ZERO, 16.0 / 10.0)
    }
}
