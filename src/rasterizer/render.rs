//! Framebuffer and triangle rasterization
//!
//! Bounding-box rasterizer with edge functions, pixel-center sampling,
//! perspective-correct depth and a strict `<` depth test (first writer
//! wins on ties). Output does not depend on triangle order.
//!
//! `render_frame` runs the whole per-frame pipeline over a scene.

use crate::world::Scene;
use super::assembly::assemble_mesh;
use super::camera::{to_camera_space, Camera};
use super::math::{edge_function, Vec2, Vec3};
use super::projection::{ProjectedVertex, Projector};
use super::types::{Color, FrameStats, RasterSettings, Triangle};

/// Color + depth buffers at a fixed resolution
pub struct Framebuffer {
    pub color: Vec<Color>,
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: vec![Color::BLACK; width * height],
            depth: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    /// Reset every color cell to `background` and every depth cell to +inf
    pub fn clear(&mut self, background: Color) {
        self.color.fill(background);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.color[y * self.width + x])
        } else {
            None
        }
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.depth[y * self.width + x])
        } else {
            None
        }
    }

    /// Depth-tested write. Returns true when the fragment was stored.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if z < self.depth[idx] {
                self.depth[idx] = z;
                self.color[idx] = color;
                return true;
            }
        }
        false
    }

    /// Copy the color buffer out as tightly packed RGBA bytes
    pub fn write_rgba(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.color.len() * 4);
        for c in &self.color {
            out.extend_from_slice(&c.to_rgba());
        }
    }

    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.color[y as usize * self.width + x as usize].to_rgb())
        })
    }
}

/// Size of the coordinate space triangles were projected into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport matching a framebuffer one-to-one
    pub fn of(fb: &Framebuffer) -> Self {
        Self::new(fb.width as f32, fb.height as f32)
    }
}

/// `1 / (w1/z1 + w2/z2 + w3/z3)`, given the reciprocal depths
#[inline]
pub fn perspective_depth(weights: (f32, f32, f32), inv_z: (f32, f32, f32)) -> f32 {
    let inv = weights.0 * inv_z.0 + weights.1 * inv_z.1 + weights.2 * inv_z.2;
    1.0 / inv
}

/// Rasterize a single triangle. Returns the number of fragments written.
pub fn rasterize_triangle(fb: &mut Framebuffer, tri: &Triangle, viewport: Viewport) -> usize {
    if fb.width == 0 || fb.height == 0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return 0;
    }

    // Window coordinates -> framebuffer coordinates
    let sx = fb.width as f32 / viewport.width;
    let sy = fb.height as f32 / viewport.height;
    let v1 = Vec2::new(tri.p1.x * sx, tri.p1.y * sy);
    let v2 = Vec2::new(tri.p2.x * sx, tri.p2.y * sy);
    let v3 = Vec2::new(tri.p3.x * sx, tri.p3.y * sy);

    // Bounding box
    let min_x = v1.x.min(v2.x).min(v3.x).floor().max(0.0);
    let min_y = v1.y.min(v2.y).min(v3.y).floor().max(0.0);
    let max_x = v1.x.max(v2.x).max(v3.x).ceil().min(fb.width as f32 - 1.0);
    let max_y = v1.y.max(v2.y).max(v3.y).ceil().min(fb.height as f32 - 1.0);
    if !(min_x <= max_x && min_y <= max_y) {
        return 0;
    }

    let area = edge_function(v1, v2, v3);
    if area == 0.0 || !area.is_finite() {
        return 0;
    }
    let inv_area = 1.0 / area;
    let inv_z = (1.0 / tri.z1, 1.0 / tri.z2, 1.0 / tri.z3);

    let mut written = 0;
    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w1 = edge_function(v2, v3, p) * inv_area;
            let w2 = edge_function(v3, v1, p) * inv_area;
            let w3 = 1.0 - w1 - w2;

            if w1 >= 0.0 && w2 >= 0.0 && w3 >= 0.0 {
                let z = perspective_depth((w1, w2, w3), inv_z);
                if fb.set_pixel_with_depth(x, y, z, tri.color) {
                    written += 1;
                }
            }
        }
    }
    written
}

/// Render one frame of `scene` as seen from `camera`.
///
/// Clears the framebuffer, transforms and projects every vertex into
/// `viewport` space, assembles each mesh's faces into triangles and
/// rasterizes them. The viewport may differ from the framebuffer size;
/// the rasterizer rescales.
pub fn render_frame(
    fb: &mut Framebuffer,
    scene: &Scene,
    camera: &Camera,
    settings: &RasterSettings,
    viewport: Viewport,
) -> FrameStats {
    fb.clear(settings.background);

    let (_, rt) = camera.view_basis();
    let projector = Projector::new(settings.fov_radians(), viewport.width, viewport.height, settings.near);

    let mut stats = FrameStats::default();
    let mut cam_space: Vec<Vec3> = Vec::new();
    let mut projected: Vec<Option<ProjectedVertex>> = Vec::new();
    let mut triangles: Vec<Triangle> = Vec::new();

    for mesh in &scene.meshes {
        cam_space.clear();
        projected.clear();
        for v in &mesh.vertices {
            let cam_pos = to_camera_space(&rt, camera.position, *v);
            cam_space.push(cam_pos);
            projected.push(projector.project(cam_pos));
        }

        triangles.clear();
        let mesh_stats = assemble_mesh(
            &cam_space,
            &projected,
            &mesh.faces,
            &mesh.face_colors,
            settings,
            &mut triangles,
        );
        stats.accumulate(&mesh_stats);

        for tri in &triangles {
            stats.fragments_written += rasterize_triangle(fb, tri, viewport);
        }
        stats.rasterized += triangles.len();
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::CullMode;
    use crate::world::{create_demo_scene, Face, Material, Mesh};

    fn tri(points: [(f32, f32); 3], z: f32, color: Color) -> Triangle {
        Triangle {
            p1: Vec2::new(points[0].0, points[0].1),
            p2: Vec2::new(points[1].0, points[1].1),
            p3: Vec2::new(points[2].0, points[2].1),
            z1: z,
            z2: z,
            z3: z,
            color,
        }
    }

    fn render(fb: &mut Framebuffer, tris: &[Triangle]) {
        fb.clear(Color::BLACK);
        let vp = Viewport::of(fb);
        for t in tris {
            rasterize_triangle(fb, t, vp);
        }
    }

    #[test]
    fn test_clear_resets_buffers() {
        let mut fb = Framebuffer::new(4, 3);
        fb.set_pixel_with_depth(1, 1, 2.0, Color::RED);
        fb.clear(Color::BLUE);
        assert!(fb.color.iter().all(|c| *c == Color::BLUE));
        assert!(fb.depth.iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn test_perspective_depth_scenario() {
        let z = perspective_depth((0.5, 0.3, 0.2), (1.0 / 2.0, 1.0 / 3.0, 1.0 / 4.0));
        assert!((z - 2.5).abs() < 1e-5);

        let mut fb = Framebuffer::new(1, 1);
        fb.depth[0] = 5.0;
        assert!(fb.set_pixel_with_depth(0, 0, z, Color::GREEN));
        assert_eq!(fb.depth_at(0, 0), Some(z));
        assert_eq!(fb.pixel(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_depth_tie_first_writer_wins() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(Color::BLACK);
        assert!(fb.set_pixel_with_depth(0, 0, 3.0, Color::RED));
        assert!(!fb.set_pixel_with_depth(0, 0, 3.0, Color::BLUE));
        assert!(!fb.set_pixel_with_depth(0, 0, 4.0, Color::BLUE));
        assert_eq!(fb.pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn test_fills_pixel_centers() {
        let mut fb = Framebuffer::new(8, 8);
        render(&mut fb, &[tri([(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)], 1.0, Color::RED)]);
        // Centers with x + y + 1 <= 8 are covered
        assert_eq!(fb.pixel(0, 0), Some(Color::RED));
        assert_eq!(fb.pixel(3, 3), Some(Color::RED));
        assert_eq!(fb.pixel(4, 4), Some(Color::BLACK));
        assert_eq!(fb.pixel(7, 7), Some(Color::BLACK));
        let filled = fb.color.iter().filter(|c| **c == Color::RED).count();
        assert_eq!(filled, 36);
    }

    #[test]
    fn test_both_windings_fill() {
        let mut a = Framebuffer::new(16, 16);
        let mut b = Framebuffer::new(16, 16);
        render(&mut a, &[tri([(1.0, 1.0), (14.0, 2.0), (4.0, 13.0)], 2.0, Color::RED)]);
        render(&mut b, &[tri([(4.0, 13.0), (14.0, 2.0), (1.0, 1.0)], 2.0, Color::RED)]);
        assert_eq!(a.pixel(6, 5), Some(Color::RED));
        assert_eq!(b.pixel(6, 5), Some(Color::RED));
        let count = |fb: &Framebuffer| fb.color.iter().filter(|c| **c == Color::RED).count() as i64;
        // Only pixel centers lying exactly on an edge may differ
        assert!((count(&a) - count(&b)).abs() <= 2);
        assert!(count(&a) > 50);

        // Away from the edges both windings agree pixel for pixel
        let (v1, v2, v3) = (Vec2::new(1.0, 1.0), Vec2::new(14.0, 2.0), Vec2::new(4.0, 13.0));
        let mut interior = 0;
        for y in 0..16 {
            for x in 0..16 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let edges = [edge_function(v1, v2, p), edge_function(v2, v3, p), edge_function(v3, v1, p)];
                if edges.iter().all(|e| *e >= 0.5) {
                    interior += 1;
                    assert_eq!(a.pixel(x, y), Some(Color::RED), "({}, {})", x, y);
                    assert_eq!(b.pixel(x, y), Some(Color::RED), "({}, {})", x, y);
                } else if edges.iter().any(|e| *e <= -0.5) {
                    assert_eq!(a.pixel(x, y), Some(Color::BLACK), "({}, {})", x, y);
                    assert_eq!(b.pixel(x, y), Some(Color::BLACK), "({}, {})", x, y);
                }
            }
        }
        assert!(interior > 50);
    }

    #[test]
    fn test_degenerate_writes_nothing() {
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Color::BLACK);
        let vp = Viewport::of(&fb);
        let t = tri([(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)], 1.0, Color::RED);
        assert_eq!(rasterize_triangle(&mut fb, &t, vp), 0);
        assert!(fb.color.iter().all(|c| *c == Color::BLACK));
    }

    #[test]
    fn test_offscreen_clamped() {
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Color::BLACK);
        let vp = Viewport::of(&fb);
        let t = tri([(-50.0, -50.0), (-20.0, -50.0), (-50.0, -20.0)], 1.0, Color::RED);
        assert_eq!(rasterize_triangle(&mut fb, &t, vp), 0);

        let covering = tri([(-100.0, -100.0), (300.0, -100.0), (-100.0, 300.0)], 1.0, Color::RED);
        assert_eq!(rasterize_triangle(&mut fb, &covering, vp), 100);
    }

    #[test]
    fn test_order_independence() {
        let near = tri([(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)], 2.0, Color::RED);
        let far = tri([(2.0, 2.0), (20.0, 4.0), (6.0, 20.0)], 5.0, Color::BLUE);

        let mut a = Framebuffer::new(20, 20);
        let mut b = Framebuffer::new(20, 20);
        render(&mut a, &[near, far]);
        render(&mut b, &[far, near]);
        assert_eq!(a.color, b.color);
        assert_eq!(a.depth, b.depth);
        assert!(a.color.iter().any(|c| *c == Color::BLUE));
    }

    #[test]
    fn test_rerender_is_identical() {
        let tris = [
            tri([(0.0, 0.0), (20.0, 3.0), (5.0, 18.0)], 3.0, Color::RED),
            tri([(4.0, 1.0), (19.0, 19.0), (1.0, 12.0)], 2.5, Color::GREEN),
        ];
        let mut fb = Framebuffer::new(20, 20);
        render(&mut fb, &tris);
        let first = fb.color.clone();
        render(&mut fb, &tris);
        assert_eq!(first, fb.color);
    }

    #[test]
    fn test_interpolated_depth_is_perspective_correct() {
        let t = Triangle {
            p1: Vec2::new(0.0, 0.0),
            p2: Vec2::new(64.0, 0.0),
            p3: Vec2::new(0.0, 64.0),
            z1: 2.0,
            z2: 8.0,
            z3: 2.0,
            color: Color::RED,
        };
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(Color::BLACK);
        let vp = Viewport::of(&fb);
        rasterize_triangle(&mut fb, &t, vp);

        // Halfway along the p1-p2 edge in screen space: 1/z is averaged, not z.
        let z = fb.depth_at(31, 0).unwrap();
        let (w2, w1) = (31.5 / 64.0, 1.0 - 31.5 / 64.0 - 0.5 / 64.0);
        let expected = perspective_depth((w1, w2, 0.5 / 64.0), (0.5, 0.125, 0.5));
        assert!((z - expected).abs() < 1e-3);
        assert!(z < 5.0);
    }

    #[test]
    fn test_viewport_scaling() {
        // Triangle in a 100x100 window covering the left half, buffer is 10x10
        let t = tri([(0.0, 0.0), (50.0, 0.0), (0.0, 100.0)], 1.0, Color::RED);
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Color::BLACK);
        rasterize_triangle(&mut fb, &t, Viewport::new(100.0, 100.0));
        assert_eq!(fb.pixel(0, 0), Some(Color::RED));
        assert_eq!(fb.pixel(6, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_export_rgba_and_image() {
        let mut fb = Framebuffer::new(3, 2);
        fb.clear(Color::new(10, 20, 30));
        let mut bytes = Vec::new();
        fb.write_rgba(&mut bytes);
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[0..4], &[10, 20, 30, 255]);
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30]);
    }

    fn single_mesh_scene(vertices: &[Vec3], faces: Vec<Face>) -> Scene {
        let mut mesh = Mesh::new("test", Material::Flat(Color::RED));
        for v in vertices {
            mesh.add_vertex(v.x, v.y, v.z);
        }
        for f in faces {
            mesh.add_face(f);
        }
        let mut scene = Scene::new();
        scene.add_mesh(mesh);
        scene
    }

    #[test]
    fn test_render_frame_demo_scene() {
        let scene = create_demo_scene();
        let camera = Camera::new(Vec3::new(0.0, 1.7, -6.0));
        let settings = RasterSettings::default();
        let mut fb = Framebuffer::new(settings.buffer_width, settings.buffer_height);
        let vp = Viewport::of(&fb);

        let stats = render_frame(&mut fb, &scene, &camera, &settings, vp);
        assert!(stats.rasterized > 0);
        assert!(stats.fragments_written > 0);
        assert_eq!(
            stats.considered,
            stats.rejected_near + stats.rejected_degenerate + stats.culled + stats.rasterized
        );

        // Ground below the horizon, sky above
        assert_ne!(fb.pixel(320, 470), Some(settings.background));
        assert_eq!(fb.pixel(320, 5), Some(settings.background));
    }

    #[test]
    fn test_render_frame_excludes_near_vertex() {
        let scene = single_mesh_scene(
            &[Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, -1.0, 2.0), Vec3::new(0.0, 1.0, 0.0005)],
            vec![Face::tri(0, 1, 2)],
        );
        let settings = RasterSettings::default();
        let mut fb = Framebuffer::new(64, 48);
        let vp = Viewport::of(&fb);

        let stats = render_frame(&mut fb, &scene, &Camera::default(), &settings, vp);
        assert_eq!(stats.considered, 1);
        assert_eq!(stats.rejected_near, 1);
        assert_eq!(stats.rasterized, 0);
        assert_eq!(stats.fragments_written, 0);
        assert!(fb.color.iter().all(|c| *c == settings.background));
    }

    #[test]
    fn test_render_frame_skips_geometry_behind_camera() {
        let scene = single_mesh_scene(
            &[Vec3::new(-1.0, -1.0, -0.5), Vec3::new(1.0, -1.0, -0.5), Vec3::new(0.0, 1.0, -0.5)],
            vec![Face::tri(0, 1, 2)],
        );
        let settings = RasterSettings::default();
        let mut fb = Framebuffer::new(64, 48);
        let vp = Viewport::of(&fb);

        let stats = render_frame(&mut fb, &scene, &Camera::default(), &settings, vp);
        assert_eq!(stats.rasterized, 0);
        assert_eq!(stats.fragments_written, 0);
        assert!(fb.depth.iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn test_render_frame_cull_modes() {
        let points = [Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, -1.0, 5.0), Vec3::new(0.0, 1.0, 5.0)];
        let facing = single_mesh_scene(&points, vec![Face::tri(0, 1, 2)]);
        let away = single_mesh_scene(&points, vec![Face::tri(0, 2, 1)]);
        let mut fb = Framebuffer::new(64, 48);
        let vp = Viewport::of(&fb);

        let mut settings = RasterSettings::default();
        let camera = Camera::default();
        assert_eq!(render_frame(&mut fb, &away, &camera, &settings, vp).rasterized, 1);
        assert_eq!(fb.pixel(32, 24), Some(Color::RED));

        settings.cull_mode = CullMode::Back;
        let stats = render_frame(&mut fb, &away, &camera, &settings, vp);
        assert_eq!((stats.culled, stats.rasterized), (1, 0));
        assert_eq!(fb.pixel(32, 24), Some(settings.background));

        let stats = render_frame(&mut fb, &facing, &camera, &settings, vp);
        assert_eq!((stats.culled, stats.rasterized), (0, 1));
        assert_eq!(fb.pixel(32, 24), Some(Color::RED));
    }

    #[test]
    fn test_render_frame_is_repeatable() {
        let scene = create_demo_scene();
        let camera = Camera::with_orientation(Vec3::new(2.0, 2.5, -4.0), 0.3, 0.1);
        let settings = RasterSettings::default();
        let mut fb = Framebuffer::new(160, 120);
        let vp = Viewport::new(640.0, 480.0);

        let first_stats = render_frame(&mut fb, &scene, &camera, &settings, vp);
        let first = fb.color.clone();
        let second_stats = render_frame(&mut fb, &scene, &camera, &settings, vp);
        assert_eq!(first, fb.color);
        assert_eq!(first_stats, second_stats);
    }
}
