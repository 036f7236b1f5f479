//! Visual-side state types shared with the web frontend.
//!
//! These types avoid platform-specific APIs; the web renderer consumes them
//! to build camera matrices and the particle group transform.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn looking_at_origin(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Slow wobble of the particle group: X tilts with wall-clock time, Y spins a
/// fixed step per frame.
#[derive(Clone, Debug, Default)]
pub struct GroupRotation {
    pub x: f32,
    pub y: f32,
}

impl GroupRotation {
    pub fn advance(&mut self, now_ms: f64) {
        self.x = ((now_ms * ROTATION_X_RATE_PER_MS).cos() as f32)
            * ROTATION_X_AMPLITUDE_DEG.to_radians();
        self.y += ROTATION_Y_STEP_DEG.to_radians();
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.x) * Mat4::from_rotation_y(self.y)
    }
}
