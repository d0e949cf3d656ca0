//! First-person camera
//!
//! Orientation is yaw/pitch only. The view rotation is `R = Ry(yaw) * Rx(pitch)`;
//! its first column is the world-space right axis and its third column the
//! forward axis. The camera looks along +Z of its own frame, so visible
//! points have positive camera-space depth.

use super::math::{Mat3, Vec3};

/// Pitch limit in radians (~83 degrees), keeps the view from flipping over
pub const PITCH_LIMIT: f32 = 1.45;

/// Held movement keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

/// Camera state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_orientation(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// View rotation and its inverse (the transpose, since `R` is orthonormal)
    pub fn view_basis(&self) -> (Mat3, Mat3) {
        let r = Mat3::rotation_y(self.yaw) * Mat3::rotation_x(self.pitch);
        let rt = r.transpose();
        (r, rt)
    }

    pub fn right(&self) -> Vec3 {
        self.view_basis().0.column(0)
    }

    pub fn forward(&self) -> Vec3 {
        self.view_basis().0.column(2)
    }

    /// `Rt * (p - position)`: translate first, then apply the inverse rotation
    pub fn world_to_camera(&self, point: Vec3) -> Vec3 {
        let (_, rt) = self.view_basis();
        to_camera_space(&rt, self.position, point)
    }

    /// Apply a mouse-look delta (in pixels). Pitch is clamped afterwards.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += dx * sensitivity;
        self.pitch = (self.pitch + dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the current forward/right axes for `dt` seconds.
    /// Opposing keys cancel out.
    pub fn advance(&mut self, keys: MoveKeys, speed: f32, dt: f32) {
        let forward = self.forward();
        let right = self.right();

        let mut delta = Vec3::ZERO;
        if keys.forward {
            delta = delta + forward;
        }
        if keys.back {
            delta = delta - forward;
        }
        if keys.right {
            delta = delta + right;
        }
        if keys.left {
            delta = delta - right;
        }

        self.position = self.position + delta * (speed * dt);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Camera-space transform with a precomputed inverse rotation
#[inline]
pub fn to_camera_space(rt: &Mat3, eye: Vec3, point: Vec3) -> Vec3 {
    rt.transform(point - eye)
}
