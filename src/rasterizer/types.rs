//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::Vec2;

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const GRAY: Color = Color { r: 150, g: 150, b: 150 };
    pub const SKY: Color = Color { r: 135, g: 190, b: 235 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to [u8; 4] RGBA with full alpha (window texture upload)
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A triangle ready for rasterization.
///
/// Screen points are in window coordinates; depths are camera-space `z`
/// and are always greater than the near plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
    pub z1: f32,
    pub z2: f32,
    pub z3: f32,
    pub color: Color,
}

/// Which triangles to discard by facing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    /// Render both sides
    #[default]
    None,
    /// Drop triangles whose front (counter-clockwise) side faces away
    Back,
}

impl CullMode {
    pub fn toggled(self) -> Self {
        match self {
            CullMode::None => CullMode::Back,
            CullMode::Back => CullMode::None,
        }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Camera-space depth at or below which vertices are rejected
    pub near: f32,
    /// Minimum absolute screen-space signed area for a triangle to survive assembly
    pub area_epsilon: f32,
    /// Fixed framebuffer resolution
    pub buffer_width: usize,
    pub buffer_height: usize,
    /// Clear color
    pub background: Color,
    pub cull_mode: CullMode,
}

impl RasterSettings {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 1e-3,
            area_epsilon: 1e-6,
            buffer_width: 640,
            buffer_height: 480,
            background: Color::SKY,
            cull_mode: CullMode::None,
        }
    }
}

/// Counters collected over one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Fan triangles produced from all faces
    pub considered: usize,
    /// Missing vertex data or a vertex at/behind the near plane
    pub rejected_near: usize,
    /// Screen-space area below epsilon
    pub rejected_degenerate: usize,
    pub culled: usize,
    pub rasterized: usize,
    /// Fragments that passed the depth test
    pub fragments_written: usize,
}

impl FrameStats {
    pub fn accumulate(&mut self, other: &FrameStats) {
        self.considered += other.considered;
        self.rejected_near += other.rejected_near;
        self.rejected_degenerate += other.rejected_degenerate;
        self.culled += other.culled;
        self.rasterized += other.rasterized;
        self.fragments_written += other.fragments_written;
    }
}
