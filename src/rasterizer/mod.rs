//! CPU software rasterizer
//!
//! Pipeline stages, leaves first:
//! - Vector/matrix kernel
//! - Yaw/pitch camera
//! - Perspective projection with near-plane rejection
//! - Polygon fan assembly with validity filtering
//! - Z-buffered, perspective-correct triangle rasterization

mod math;
mod types;
mod camera;
mod projection;
mod assembly;
mod render;

pub use math::*;
pub use types::*;
pub use camera::*;
pub use render::*;
