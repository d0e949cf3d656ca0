//! World module - static scene description
//!
//! - Meshes of world-space vertices and convex polygon faces
//! - Explicit per-mesh material tags that assign face colors
//! - RON scene files and a built-in demo scene

mod geometry;
mod material;
mod scene_file;
mod demo;

pub use geometry::*;
pub use material::*;
pub use scene_file::*;
pub use demo::*;
