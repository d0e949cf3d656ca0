//! Triangle assembly
//!
//! Turns polygon faces into raster-ready triangles. Polygons are fanned
//! from their first vertex, which is only correct for convex, consistently
//! wound faces. Concave input is triangulated incorrectly without warning.

use super::math::{edge_function, Vec3};
use super::projection::ProjectedVertex;
use super::types::{Color, CullMode, FrameStats, RasterSettings, Triangle};

/// Fan triangulation of a polygon: `(v0, v1, v2), (v0, v2, v3), ...`.
/// Yields `n - 2` index triples for an `n`-gon, nothing for fewer than three indices.
pub fn fan_triangles(polygon: &[usize]) -> impl Iterator<Item = [usize; 3]> + '_ {
    let origin = polygon.first().copied();
    polygon
        .windows(2)
        .skip(1)
        .filter_map(move |pair| origin.map(|o| [o, pair[0], pair[1]]))
}

/// Assemble triangles for one mesh, appending survivors to `out`.
///
/// `camera_space` and `screen` are parallel per-vertex arrays; a `None`
/// screen entry marks a vertex that failed projection. Indices that fall
/// outside either array are treated the same way.
pub fn assemble_mesh<F: AsRef<[usize]>>(
    camera_space: &[Vec3],
    screen: &[Option<ProjectedVertex>],
    faces: &[F],
    colors: &[Color],
    settings: &RasterSettings,
    out: &mut Vec<Triangle>,
) -> FrameStats {
    let mut stats = FrameStats::default();

    for (face_idx, face) in faces.iter().enumerate() {
        let color = colors.get(face_idx).copied().unwrap_or(Color::GRAY);

        for [a, b, c] in fan_triangles(face.as_ref()) {
            stats.considered += 1;

            let (Some(p1), Some(p2), Some(p3)) = (vertex(screen, a), vertex(screen, b), vertex(screen, c)) else {
                stats.rejected_near += 1;
                continue;
            };
            let (Some(c1), Some(c2), Some(c3)) = (camera_space.get(a), camera_space.get(b), camera_space.get(c)) else {
                stats.rejected_near += 1;
                continue;
            };
            if c1.z <= settings.near || c2.z <= settings.near || c3.z <= settings.near {
                stats.rejected_near += 1;
                continue;
            }

            let area = edge_function(p1.screen, p2.screen, p3.screen);
            if area.abs() < settings.area_epsilon {
                stats.rejected_degenerate += 1;
                continue;
            }

            // Screen y points down, so faces wound counter-clockwise as seen
            // by the viewer have negative signed area here.
            if settings.cull_mode == CullMode::Back && area > 0.0 {
                stats.culled += 1;
                continue;
            }

            out.push(Triangle {
                p1: p1.screen,
                p2: p2.screen,
                p3: p3.screen,
                z1: c1.z,
                z2: c2.z,
                z3: c3.z,
                color,
            });
        }
    }

    stats
}

fn vertex(screen: &[Option<ProjectedVertex>], idx: usize) -> Option<ProjectedVertex> {
    screen.get(idx).copied().flatten()
}
