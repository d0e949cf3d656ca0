//! Scene geometry
//!
//! Pure data: meshes of world-space vertices and polygonal faces, each mesh
//! tagged with a material that decides its face colors. Rendering lives in
//! the rasterizer.

use serde::{Serialize, Deserialize};
use crate::rasterizer::{Color, Vec3};
use super::material::Material;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Empty box that any point will expand
    pub fn empty() -> Self {
        Self::new(
            Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        )
    }

    /// Expand bounds to include a point
    pub fn expand(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Get center of the box
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }
}

/// A convex polygon, as 0-based indices into its mesh's vertices.
///
/// Vertices are expected in counter-clockwise order when the face is
/// viewed from its front side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn tri(v0: usize, v1: usize, v2: usize) -> Self {
        Self::new(vec![v0, v1, v2])
    }

    pub fn quad(v0: usize, v1: usize, v2: usize, v3: usize) -> Self {
        Self::new(vec![v0, v1, v2, v3])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Reversed winding (flips which side is the front)
    pub fn flipped(&self) -> Self {
        let mut indices = self.indices.clone();
        indices.reverse();
        Self { indices }
    }
}

impl AsRef<[usize]> for Face {
    fn as_ref(&self) -> &[usize] {
        &self.indices
    }
}

/// A static mesh with an explicit material tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    /// World-space vertex positions
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    #[serde(default)]
    pub material: Material,
    /// One color per face, derived from `material` - not serialized
    #[serde(skip)]
    pub face_colors: Vec<Color>,
    /// Derived from vertices - not serialized
    #[serde(skip)]
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            material,
            face_colors: Vec::new(),
            bounds: Aabb::empty(),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) -> usize {
        let v = Vec3::new(x, y, z);
        self.bounds.expand(v);
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Add a quad face
    pub fn add_quad(&mut self, v0: usize, v1: usize, v2: usize, v3: usize) {
        self.faces.push(Face::quad(v0, v1, v2, v3));
    }

    /// Add a triangle face
    pub fn add_tri(&mut self, v0: usize, v1: usize, v2: usize) {
        self.faces.push(Face::tri(v0, v1, v2));
    }

    /// Recompute derived data (call after building or loading from file)
    pub fn finalize(&mut self) {
        self.face_colors = self.material.face_colors(self.faces.len());
        self.recalculate_bounds();
    }

    pub fn recalculate_bounds(&mut self) {
        if self.vertices.is_empty() {
            self.bounds = Aabb::default();
            return;
        }
        self.bounds = Aabb::empty();
        for v in &self.vertices {
            self.bounds.expand(*v);
        }
    }

    /// First face that references a missing vertex or has fewer than three
    /// indices, as `(face, offending index)`. A short face reports its length.
    pub fn find_invalid_face(&self) -> Option<(usize, usize)> {
        self.faces.iter().enumerate().find_map(|(i, face)| {
            if face.len() < 3 {
                return Some((i, face.len()));
            }
            face.indices
                .iter()
                .find(|idx| **idx >= self.vertices.len())
                .map(|idx| (i, *idx))
        })
    }

    /// Faces that are not planar-convex with a consistent winding.
    /// Fan triangulation is only correct for faces that pass this check.
    pub fn nonconvex_faces(&self) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| !self.is_convex(face))
            .map(|(i, _)| i)
            .collect()
    }

    fn is_convex(&self, face: &Face) -> bool {
        let n = face.len();
        if n <= 3 {
            return true;
        }
        let Some(points) = face
            .indices
            .iter()
            .map(|i| self.vertices.get(*i).copied())
            .collect::<Option<Vec<Vec3>>>()
        else {
            return false;
        };

        // Every corner's turn must agree with the polygon's overall normal
        let mut reference = Vec3::ZERO;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let c = points[(i + 2) % n];
            reference = reference + (b - a).cross(c - b);
        }
        let reference = reference.normalize();
        if reference == Vec3::ZERO {
            return false;
        }

        (0..n).all(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            let c = points[(i + 2) % n];
            let turn = (b - a).cross(c - b);
            turn.dot(reference) >= -1e-5 * turn.len().max(1.0)
                && (c - a).dot(reference).abs() <= 1e-3 * (c - a).len().max(1.0)
        })
    }
}

/// All meshes in the world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    /// Add a mesh (finalizing its derived data) and return its index
    pub fn add_mesh(&mut self, mut mesh: Mesh) -> usize {
        mesh.finalize();
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }
}
