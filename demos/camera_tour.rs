//! Load a point cloud and fly a camera path with synthetic frame ticks
//!
//! `cargo run --bin camera_tour -- city.laz --path rotate --fps 30`

use anyhow::{Context, Result};
use clap::Parser;
use lidarview_core::PerformanceProfile;
use lidarview_io::{ingest_files, IngestOptions};
use lidarview_visualization::{Camera, NavigationMode, RenderTarget, ViewerContext};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Upper bound on simulated frames, in case a path never finishes
const MAX_FRAMES: usize = 100_000;

#[derive(Parser, Debug)]
#[command(about = "Fly a named camera path over a point cloud")]
struct Args {
    /// LAS or LAZ files, merged in the order given
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Camera path to play
    #[arg(long, default_value = "overview")]
    path: String,

    /// Navigation mode before the tour starts (fps or orbit)
    #[arg(long, default_value = "orbit")]
    mode: NavigationMode,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Print the camera every this many frames
    #[arg(long, default_value_t = 30)]
    every: usize,

    /// Base URL for the shareable link printed at the end
    #[arg(long, default_value = "https://localhost/")]
    share_url: String,
}

/// Stands in for a GPU renderer and just counts what it receives
#[derive(Default)]
struct HeadlessTarget {
    points: usize,
    color_uploads: usize,
    point_size: f32,
}

impl RenderTarget for HeadlessTarget {
    fn upload_points(&mut self, positions: &[f32], _colors: &[f32]) {
        self.points = positions.len() / 3;
    }

    fn update_colors(&mut self, _colors: &[f32]) {
        self.color_uploads += 1;
    }

    fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    fn set_camera(&mut self, camera: &Camera) {
        debug!(position = ?camera.position, target = ?camera.target, "Frame");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let profile = PerformanceProfile::default();
    let outcome = ingest_files(&args.files, IngestOptions::from_profile(&profile), |_| {})
        .await
        .context("Failed to load point cloud")?;
    if let Some(summary) = outcome.failure_summary() {
        tracing::warn!("{summary}");
    }

    let mut target = HeadlessTarget::default();
    let mut viewer = ViewerContext::new(profile).with_navigation_mode(args.mode);
    viewer.load_dataset(outcome.dataset, &mut target);
    info!(points = target.points, "Uploaded to headless target");

    let finished = Rc::new(Cell::new(false));
    let flag = Rc::clone(&finished);
    viewer
        .play_path(&args.path, Some(Box::new(move |_: &str| flag.set(true))))
        .with_context(|| {
            let known: Vec<_> = viewer.paths().ids().collect();
            format!("Unknown path; available: {}", known.join(", "))
        })?;

    let dt = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));
    let mut frames = 0;
    while !finished.get() && frames < MAX_FRAMES {
        viewer.frame(dt, &mut target);
        frames += 1;
        if frames % args.every.max(1) == 0 {
            let camera = viewer.camera();
            println!(
                "frame {frames:>6}  camera ({:.1}, {:.1}, {:.1})  looking at ({:.1}, {:.1}, {:.1})  point size {:.2}",
                camera.position.x,
                camera.position.y,
                camera.position.z,
                camera.target.x,
                camera.target.y,
                camera.target.z,
                target.point_size
            );
        }
    }

    let view = viewer.capture_viewpoint();
    println!("\nFinished after {frames} frames ({:.1}s simulated)", dt.as_secs_f64() * frames as f64);
    println!("Final view: {}", view.to_compact());
    println!("Share: {}", view.shareable_url(&args.share_url));
    Ok(())
}
