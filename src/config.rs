//! Runtime configuration
//!
//! A single RON file with window, render, control and camera sections.
//! Every field has a default, so a config file only needs the values it
//! changes and a missing section is the same as an empty one.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::rasterizer::{Camera, RasterSettings, Vec3};

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    /// Parsed, but a value is outside the range the renderer can use
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: format!("depthwalk v{}", crate::VERSION),
            width: 1280,
            height: 960,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// World units per second
    pub move_speed: f32,
    /// Radians per pixel of mouse movement
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            mouse_sensitivity: 0.003,
        }
    }
}

/// Where the camera starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.7, -6.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera::with_orientation(self.position, self.yaw, self.pitch)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RasterSettings,
    pub controls: ControlsConfig,
    pub camera: CameraConfig,
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

pub fn load_config_from_str(s: &str) -> Result<Config, ConfigError> {
    let config: Config = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject render settings that would break projection or presentation.
    /// The near plane must be positive so every rasterized depth is too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.render;
        if !(r.near.is_finite() && r.near > 0.0) {
            return Err(ConfigError::Invalid(format!("render.near must be > 0, got {}", r.near)));
        }
        if !(r.fov_degrees > 0.0 && r.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "render.fov_degrees must be in (0, 180), got {}",
                r.fov_degrees
            )));
        }
        let max = u16::MAX as usize;
        if !(1..=max).contains(&r.buffer_width) || !(1..=max).contains(&r.buffer_height) {
            return Err(ConfigError::Invalid(format!(
                "render buffer must be between 1x1 and {}x{}, got {}x{}",
                max, max, r.buffer_width, r.buffer_height
            )));
        }
        Ok(())
    }
}
