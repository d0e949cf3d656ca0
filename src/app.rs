//! Application state
//!
//! Owns the camera, scene and framebuffer, applies one frame of input,
//! runs the pipeline and hands the color buffer to the window.

use std::path::{Path, PathBuf};
use log::{debug, error, info};
use macroquad::prelude as mq;
use crate::config::Config;
use crate::input::FrameInput;
use crate::rasterizer::{render_frame, Camera, FrameStats, Framebuffer, RasterSettings, Viewport};
use crate::world::Scene;

/// Error type for PNG snapshots
#[derive(Debug)]
pub enum SnapshotError {
    ImageError(image::ImageError),
    IoError(std::io::Error),
}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::ImageError(e)
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        SnapshotError::IoError(e)
    }
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::ImageError(e) => write!(f, "Image error: {}", e),
            SnapshotError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Write the color buffer as a PNG, creating parent directories as needed
pub fn save_snapshot<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    fb.to_image().save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Frame statistics summed over roughly one second
#[derive(Debug, Clone, Default)]
pub struct StatsWindow {
    totals: FrameStats,
    frames: u32,
    elapsed: f32,
}

/// One second's worth of averaged statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    pub fps: f32,
    pub per_frame: FrameStats,
}

impl StatsWindow {
    /// Add a frame; returns a report once a full second has accumulated
    pub fn push(&mut self, stats: &FrameStats, dt: f32) -> Option<StatsReport> {
        self.totals.accumulate(stats);
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return None;
        }

        let n = self.frames as usize;
        let t = &self.totals;
        let report = StatsReport {
            fps: self.frames as f32 / self.elapsed,
            per_frame: FrameStats {
                considered: t.considered / n,
                rejected_near: t.rejected_near / n,
                rejected_degenerate: t.rejected_degenerate / n,
                culled: t.culled / n,
                rasterized: t.rasterized / n,
                fragments_written: t.fragments_written / n,
            },
        };
        *self = Self::default();
        Some(report)
    }
}

pub struct AppState {
    pub camera: Camera,
    pub scene: Scene,
    pub settings: RasterSettings,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub fb: Framebuffer,
    pub last_stats: FrameStats,
    stats_window: StatsWindow,
    /// Reused RGBA upload buffer
    rgba: Vec<u8>,
    screenshot_dir: PathBuf,
    screenshot_count: u32,
}

impl AppState {
    pub fn new(config: Config, scene: Scene) -> Self {
        let settings = config.render;
        Self {
            camera: config.camera.to_camera(),
            scene,
            fb: Framebuffer::new(settings.buffer_width, settings.buffer_height),
            settings,
            move_speed: config.controls.move_speed,
            mouse_sensitivity: config.controls.mouse_sensitivity,
            last_stats: FrameStats::default(),
            stats_window: StatsWindow::default(),
            rgba: Vec::new(),
            screenshot_dir: PathBuf::from("screenshots"),
            screenshot_count: 0,
        }
    }

    /// Apply one frame of input. Look is applied before movement so a frame's
    /// motion follows the new heading.
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        let (dx, dy) = input.look;
        if dx != 0.0 || dy != 0.0 {
            self.camera.look(dx, dy, self.mouse_sensitivity);
        }
        self.camera.advance(input.keys, self.move_speed, dt);

        if input.toggle_cull {
            self.settings.cull_mode = self.settings.cull_mode.toggled();
            info!("Cull mode: {:?}", self.settings.cull_mode);
        }
        if input.screenshot {
            self.screenshot();
        }
    }

    /// Render the scene; `viewport` is the size of the window it will be shown in
    pub fn render(&mut self, viewport: Viewport) -> FrameStats {
        self.last_stats = render_frame(&mut self.fb, &self.scene, &self.camera, &self.settings, viewport);
        self.last_stats
    }

    /// Feed the last frame into the once-per-second debug line
    pub fn record_frame_time(&mut self, dt: f32) {
        if let Some(report) = self.stats_window.push(&self.last_stats, dt) {
            let s = report.per_frame;
            debug!(
                "{:.0} fps | tris {} -> {} drawn ({} near, {} degenerate, {} culled) | {} fragments",
                report.fps,
                s.considered,
                s.rasterized,
                s.rejected_near,
                s.rejected_degenerate,
                s.culled,
                s.fragments_written
            );
        }
    }

    fn screenshot(&mut self) {
        self.screenshot_count += 1;
        let path = self.screenshot_dir.join(format!("depthwalk-{:04}.png", self.screenshot_count));
        match save_snapshot(&self.fb, &path) {
            Ok(()) => info!("Saved screenshot to {}", path.display()),
            Err(e) => error!("Screenshot failed: {}", e),
        }
    }

    /// Upload the color buffer and draw it stretched over the whole window
    pub fn present(&mut self) {
        self.fb.write_rgba(&mut self.rgba);
        let texture = mq::Texture2D::from_rgba8(self.fb.width as u16, self.fb.height as u16, &self.rgba);
        texture.set_filter(mq::FilterMode::Nearest);

        mq::draw_texture_ex(
            &texture,
            0.0,
            0.0,
            mq::WHITE,
            mq::DrawTextureParams {
                dest_size: Some(mq::Vec2::new(mq::screen_width(), mq::screen_height())),
                ..Default::default()
            },
        );
    }
}
