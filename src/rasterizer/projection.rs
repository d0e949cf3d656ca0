//! Perspective projection of camera-space points to window coordinates

use super::math::{Vec2, Vec3};

/// A projected vertex: window position plus the camera-space depth it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedVertex {
    pub screen: Vec2,
    pub depth: f32,
}

/// Vertical focal length in pixels for a given vertical field of view
pub fn focal_length(fov_radians: f32, height: f32) -> f32 {
    (height * 0.5) / (fov_radians * 0.5).tan()
}

/// Projection parameters for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub focal: f32,
    pub width: f32,
    pub height: f32,
    pub near: f32,
}

impl Projector {
    pub fn new(fov_radians: f32, width: f32, height: f32, near: f32) -> Self {
        Self {
            focal: focal_length(fov_radians, height),
            width,
            height,
            near,
        }
    }

    /// Returns `None` when `z <= near`; such a vertex has no projection and
    /// every triangle using it must be dropped.
    pub fn project(&self, point: Vec3) -> Option<ProjectedVertex> {
        if point.z <= self.near {
            return None;
        }
        let f = self.focal;
        let inv_z = 1.0 / point.z;
        let screen = Vec2::new(
            f * point.x * inv_z + self.width * 0.5,
            // Screen y grows downward, camera y grows upward
            self.height * 0.5 - f * point.y * inv_z,
        );
        if !(screen.x.is_finite() && screen.y.is_finite()) {
            return None;
        }
        Some(ProjectedVertex { screen, depth: point.z })
    }
}

/// Project a single camera-space point onto a `width` x `height` image
pub fn project(point: Vec3, fov_radians: f32, width: f32, height: f32, near: f32) -> Option<ProjectedVertex> {
    Projector::new(fov_radians, width, height, near).project(point)
}
