//! Built-in demo scene: a checkered ground, a few trees, a house and a
//! pentagonal monolith.
//!
//! World convention: +X right, +Y up, +Z forward. Faces are wound
//! counter-clockwise as seen from outside, which makes the cross product
//! of their first two edges point into the solid.

use crate::rasterizer::{Color, Vec3};
use super::{Band, Face, Material, Mesh, Scene};

const GROUND_CELLS: usize = 16;
const GROUND_CELL_SIZE: f32 = 2.0;

const GRASS_LIGHT: Color = Color::new(96, 160, 72);
const GRASS_DARK: Color = Color::new(74, 132, 58);
const BARK: Color = Color::new(110, 72, 40);
const LEAVES: Color = Color::new(40, 120, 48);
const LEAVES_SHADE: Color = Color::new(28, 88, 36);
const PLASTER: Color = Color::new(222, 206, 170);
const ROOF_TILE: Color = Color::new(168, 60, 44);

/// Create the default scene used when no scene file is given
pub fn create_demo_scene() -> Scene {
    let mut scene = Scene::new();
    scene.add_mesh(ground(GROUND_CELLS, GROUND_CELL_SIZE));
    scene.add_mesh(tree("tree_a", Vec3::new(-6.0, 0.0, 8.0)));
    scene.add_mesh(tree("tree_b", Vec3::new(5.0, 0.0, 13.0)));
    scene.add_mesh(tree("tree_c", Vec3::new(-3.0, 0.0, 17.0)));
    scene.add_mesh(house("house", Vec3::new(6.0, 0.0, 4.0), Vec3::new(4.0, 3.0, 5.0), 1.6));
    scene.add_mesh(monolith("monolith", Vec3::new(0.0, 0.0, 22.0), 1.2, 5.0));
    scene
}

/// Flat square grid centred on the origin at y = 0, checkered per cell
fn ground(cells: usize, cell_size: f32) -> Mesh {
    let mut mesh = Mesh::new(
        "ground",
        Material::Checker { even: GRASS_LIGHT, odd: GRASS_DARK, columns: Some(cells) },
    );
    let half = cells as f32 * cell_size * 0.5;

    for row in 0..=cells {
        for col in 0..=cells {
            mesh.add_vertex(col as f32 * cell_size - half, 0.0, row as f32 * cell_size - half);
        }
    }

    let stride = cells + 1;
    for row in 0..cells {
        for col in 0..cells {
            let a = row * stride + col;
            // (x0, z0) -> (x1, z0) -> (x1, z1) -> (x0, z1): counter-clockwise from above
            mesh.add_quad(a, a + 1, a + stride + 1, a + stride);
        }
    }
    mesh
}

/// Add the four vertical sides of a box, returning the corner indices
/// `[bottom ring, top ring]`, each ordered (x0,z0), (x1,z0), (x1,z1), (x0,z1).
fn add_prism_sides(mesh: &mut Mesh, min: Vec3, max: Vec3) -> ([usize; 4], [usize; 4]) {
    let ring = |mesh: &mut Mesh, y: f32| {
        [
            mesh.add_vertex(min.x, y, min.z),
            mesh.add_vertex(max.x, y, min.z),
            mesh.add_vertex(max.x, y, max.z),
            mesh.add_vertex(min.x, y, max.z),
        ]
    };
    let bottom = ring(mesh, min.y);
    let top = ring(mesh, max.y);

    for i in 0..4 {
        let j = (i + 1) % 4;
        mesh.add_quad(bottom[i], bottom[j], top[j], top[i]);
    }
    (bottom, top)
}

/// Box trunk with a square pyramid crown
fn tree(name: &str, base: Vec3) -> Mesh {
    const TRUNK_HALF: f32 = 0.25;
    const TRUNK_HEIGHT: f32 = 1.2;
    const CROWN_HALF: f32 = 1.3;
    const CROWN_HEIGHT: f32 = 2.8;

    let mut mesh = Mesh::new(
        name,
        Material::Banded(vec![
            Band::new(4, BARK),
            Band::new(4, LEAVES),
            Band::new(1, LEAVES_SHADE),
        ]),
    );

    add_prism_sides(
        &mut mesh,
        Vec3::new(base.x - TRUNK_HALF, base.y, base.z - TRUNK_HALF),
        Vec3::new(base.x + TRUNK_HALF, base.y + TRUNK_HEIGHT, base.z + TRUNK_HALF),
    );

    let y = base.y + TRUNK_HEIGHT;
    let crown = [
        mesh.add_vertex(base.x - CROWN_HALF, y, base.z - CROWN_HALF),
        mesh.add_vertex(base.x + CROWN_HALF, y, base.z - CROWN_HALF),
        mesh.add_vertex(base.x + CROWN_HALF, y, base.z + CROWN_HALF),
        mesh.add_vertex(base.x - CROWN_HALF, y, base.z + CROWN_HALF),
    ];
    let apex = mesh.add_vertex(base.x, y + CROWN_HEIGHT, base.z);
    for i in 0..4 {
        mesh.add_tri(crown[i], crown[(i + 1) % 4], apex);
    }
    // Underside, seen from below
    mesh.add_quad(crown[0], crown[3], crown[2], crown[1]);
    mesh
}

/// Box walls with a gabled roof whose ridge runs along X
fn house(name: &str, corner: Vec3, size: Vec3, roof_height: f32) -> Mesh {
    let mut mesh = Mesh::new(
        name,
        Material::Banded(vec![
            Band::new(4, PLASTER),
            Band::new(2, ROOF_TILE),
            Band::new(2, PLASTER),
        ]),
    );

    let (_, top) = add_prism_sides(&mut mesh, corner, corner + size);

    let ridge_y = corner.y + size.y + roof_height;
    let ridge_z = corner.z + size.z * 0.5;
    let ridge_left = mesh.add_vertex(corner.x, ridge_y, ridge_z);
    let ridge_right = mesh.add_vertex(corner.x + size.x, ridge_y, ridge_z);

    // Slopes
    mesh.add_quad(top[0], top[1], ridge_right, ridge_left);
    mesh.add_quad(top[2], top[3], ridge_left, ridge_right);
    // Gables
    mesh.add_tri(top[3], top[0], ridge_left);
    mesh.add_tri(top[1], top[2], ridge_right);
    mesh
}

/// Upright pentagonal prism; its caps exercise five-sided faces
fn monolith(name: &str, base: Vec3, radius: f32, height: f32) -> Mesh {
    const SIDES: usize = 5;
    let mut mesh = Mesh::new(name, Material::default());

    let ring = |mesh: &mut Mesh, y: f32| -> Vec<usize> {
        (0..SIDES)
            .map(|k| {
                let angle = k as f32 * std::f32::consts::TAU / SIDES as f32;
                mesh.add_vertex(base.x + radius * angle.cos(), y, base.z + radius * angle.sin())
            })
            .collect()
    };
    let bottom = ring(&mut mesh, base.y);
    let top = ring(&mut mesh, base.y + height);

    for k in 0..SIDES {
        let next = (k + 1) % SIDES;
        mesh.add_quad(bottom[k], bottom[next], top[next], top[k]);
    }
    mesh.add_face(Face::new(top));
    mesh.add_face(Face::new(bottom).flipped());
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &Mesh, face: &Face) -> Vec3 {
        let a = mesh.vertices[face.indices[0]];
        let b = mesh.vertices[face.indices[1]];
        let c = mesh.vertices[face.indices[2]];
        (b - a).cross(c - a)
    }

    fn face_centroid(mesh: &Mesh, face: &Face) -> Vec3 {
        let sum = face
            .indices
            .iter()
            .fold(Vec3::ZERO, |acc, i| acc + mesh.vertices[*i]);
        sum * (1.0 / face.len() as f32)
    }

    #[test]
    fn test_demo_scene_is_valid() {
        let scene = create_demo_scene();
        assert_eq!(scene.meshes.len(), 6);
        for mesh in &scene.meshes {
            assert_eq!(mesh.find_invalid_face(), None, "{}", mesh.name);
            assert!(mesh.nonconvex_faces().is_empty(), "{}", mesh.name);
            assert_eq!(mesh.face_colors.len(), mesh.faces.len());
        }
    }

    #[test]
    fn test_ground_checkerboard() {
        let mesh = ground(4, 1.0);
        assert_eq!(mesh.faces.len(), 16);
        assert_eq!(mesh.vertices.len(), 25);
        let colors = mesh.material.face_colors(16);
        assert_eq!(colors[0], GRASS_LIGHT);
        assert_eq!(colors[1], GRASS_DARK);
        assert_eq!(colors[4], GRASS_DARK);
        assert_eq!(colors[5], GRASS_LIGHT);
    }

    #[test]
    fn test_ground_faces_up() {
        let mesh = ground(2, 1.0);
        for face in &mesh.faces {
            // Winding normal points into the ground
            assert!(face_normal(&mesh, face).y < 0.0);
        }
    }

    #[test]
    fn test_solids_wound_from_outside() {
        let scene = create_demo_scene();
        for mesh in scene.meshes.iter().filter(|m| m.name != "ground") {
            let center = mesh.bounds.center();
            for (i, face) in mesh.faces.iter().enumerate() {
                let inward = center - face_centroid(mesh, face);
                assert!(
                    face_normal(mesh, face).dot(inward) > 0.0,
                    "{} face {} is wound inside-out",
                    mesh.name,
                    i
                );
            }
        }
    }

    #[test]
    fn test_banded_colors_follow_parts() {
        let mut t = tree("t", Vec3::ZERO);
        t.finalize();
        assert_eq!(t.faces.len(), 9);
        assert_eq!(t.face_colors[0], BARK);
        assert_eq!(t.face_colors[4], LEAVES);
        assert_eq!(t.face_colors[8], LEAVES_SHADE);
    }

    #[test]
    fn test_monolith_has_pentagon_caps() {
        let m = monolith("m", Vec3::ZERO, 1.0, 2.0);
        assert_eq!(m.faces.len(), 7);
        assert_eq!(m.faces[5].len(), 5);
        assert_eq!(m.faces[6].len(), 5);
    }
}
