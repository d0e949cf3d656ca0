//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.

use std::fs;
use std::path::Path;
use log::warn;
use super::Scene;

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    /// A face references a vertex that does not exist
    InvalidFace { mesh: String, face: usize, index: usize },
    /// A face has fewer than three vertices
    DegenerateFace { mesh: String, face: usize },
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::InvalidFace { mesh, face, index } => {
                write!(f, "Mesh '{}' face {} references missing vertex {}", mesh, face, index)
            }
            SceneError::DegenerateFace { mesh, face } => {
                write!(f, "Mesh '{}' face {} has fewer than 3 vertices", mesh, face)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let mut scene: Scene = ron::from_str(s)?;

    for mesh in &mut scene.meshes {
        if let Some((face, index)) = mesh.find_invalid_face() {
            let name = mesh.name.clone();
            return Err(if mesh.faces[face].len() < 3 {
                SceneError::DegenerateFace { mesh: name, face }
            } else {
                SceneError::InvalidFace { mesh: name, face, index }
            });
        }

        if cfg!(debug_assertions) {
            let bad = mesh.nonconvex_faces();
            if !bad.is_empty() {
                warn!(
                    "Mesh '{}' has {} non-convex or non-planar face(s) {:?}; fan triangulation will be wrong",
                    mesh.name,
                    bad.len(),
                    bad
                );
            }
        }

        // Colors and bounds are derived, not serialized
        mesh.finalize();
    }

    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}
