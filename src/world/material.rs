//! Per-mesh material tags and face color assignment
//!
//! Colors are decided by an explicit tag on each mesh, never by guessing
//! what a mesh is from its vertex or face counts.

use serde::{Serialize, Deserialize};
use crate::rasterizer::Color;

/// A run of consecutive faces sharing one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub faces: usize,
    pub color: Color,
}

impl Band {
    pub fn new(faces: usize, color: Color) -> Self {
        Self { faces, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    /// Every face the same color
    Flat(Color),
    /// Alternate two colors by face index. With `columns` set, faces are
    /// treated as a row-major grid and alternate in a checkerboard.
    Checker {
        even: Color,
        odd: Color,
        #[serde(default)]
        columns: Option<usize>,
    },
    /// Consecutive face ranges, in order. Faces past the last band keep its color.
    Banded(Vec<Band>),
    /// Explicit color per face. Missing entries fall back to neutral gray.
    PerFace(Vec<Color>),
}

impl Default for Material {
    fn default() -> Self {
        Material::Flat(Color::GRAY)
    }
}

impl Material {
    pub fn color_of(&self, face: usize) -> Color {
        match self {
            Material::Flat(color) => *color,
            Material::Checker { even, odd, columns } => {
                let parity = match columns {
                    Some(cols) if *cols > 0 => (face / cols + face % cols) % 2,
                    _ => face % 2,
                };
                if parity == 0 { *even } else { *odd }
            }
            Material::Banded(bands) => {
                let mut start = 0;
                for band in bands {
                    if face < start + band.faces {
                        return band.color;
                    }
                    start += band.faces;
                }
                bands.last().map(|b| b.color).unwrap_or(Color::GRAY)
            }
            Material::PerFace(colors) => colors.get(face).copied().unwrap_or(Color::GRAY),
        }
    }

    /// Colors for faces `0..face_count`
    pub fn face_colors(&self, face_count: usize) -> Vec<Color> {
        (0..face_count).map(|i| self.color_of(i)).collect()
    }
}
