//! depthwalk: first-person walk through a CPU-rasterized scene
//!
//! Everything is drawn by a software pipeline:
//! - Yaw/pitch camera with WASD movement and mouse look
//! - Perspective projection with near-plane rejection
//! - Convex polygon fan triangulation
//! - Z-buffered, perspective-correct rasterization into a fixed-size buffer
//!
//! The window only displays the finished color buffer.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod world;
mod config;
mod input;
mod app;

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use log::{error, info, warn};
use macroquad::prelude::*;
use app::{save_snapshot, AppState};
use config::{load_config, Config, WindowConfig};
use input::InputState;
use rasterizer::Viewport;
use world::{create_demo_scene, load_scene, save_scene, Scene};

#[derive(Parser, Debug)]
#[command(name = "depthwalk", version, about = "Walk through a scene drawn by a CPU rasterizer")]
struct Args {
    /// RON config file (window, render, controls, camera)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RON scene file; the built-in demo scene is used when omitted
    #[arg(short, long, value_name = "FILE")]
    scene: Option<PathBuf>,

    /// Render one frame from the start camera to a PNG and exit
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,

    /// Write the active scene to a RON file and exit
    #[arg(long, value_name = "FILE")]
    dump_scene: Option<PathBuf>,
}

fn window_conf(window: &WindowConfig) -> Conf {
    Conf {
        window_title: window.title.clone(),
        window_width: window.width,
        window_height: window.height,
        window_resizable: window.resizable,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_startup_config(path: Option<&PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match load_config(path) {
        Ok(config) => {
            info!("Loaded config {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load config {}: {}, using defaults", path.display(), e);
            Config::default()
        }
    }
}

fn load_startup_scene(path: Option<&PathBuf>) -> Scene {
    let Some(path) = path else {
        return create_demo_scene();
    };
    match load_scene(path) {
        Ok(scene) => {
            info!("Loaded scene {}", path.display());
            scene
        }
        Err(e) => {
            warn!("Failed to load scene {}: {}, using demo scene", path.display(), e);
            create_demo_scene()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_startup_config(args.config.as_ref());
    let scene = load_startup_scene(args.scene.as_ref());

    info!(
        "depthwalk v{}: window {}x{}, framebuffer {}x{}, {} meshes, {} faces, {} vertices",
        VERSION,
        config.window.width,
        config.window.height,
        config.render.buffer_width,
        config.render.buffer_height,
        scene.meshes.len(),
        scene.face_count(),
        scene.vertex_count()
    );

    if let Some(path) = &args.dump_scene {
        return match save_scene(&scene, path) {
            Ok(()) => {
                info!("Wrote scene to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to write scene {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    if let Some(path) = &args.snapshot {
        let mut app = AppState::new(config, scene);
        let viewport = Viewport::of(&app.fb);
        let stats = app.render(viewport);
        info!("Snapshot: {} triangles, {} fragments", stats.rasterized, stats.fragments_written);
        return match save_snapshot(&app.fb, path) {
            Ok(()) => {
                info!("Wrote snapshot to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to write snapshot {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    let conf = window_conf(&config.window);
    macroquad::Window::from_config(conf, run(AppState::new(config, scene)));
    ExitCode::SUCCESS
}

async fn run(mut app: AppState) {
    let mut input = InputState::new();
    input.set_grabbed(true);
    info!("Click to capture the mouse, Escape to release. Tab: cull mode, F12: screenshot, Q: quit");

    loop {
        let dt = get_frame_time();
        let frame_input = input.poll();
        if frame_input.quit {
            break;
        }

        app.update(&frame_input, dt);
        app.render(Viewport::new(screen_width(), screen_height()));

        clear_background(BLACK);
        app.present();
        app.record_frame_time(dt);

        next_frame().await;
    }
}
