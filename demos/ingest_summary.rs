//! Decode and merge LAS/LAZ files, then print what the viewer would get
//!
//! `cargo run --bin ingest_summary -- tile_a.laz tile_b.laz --device mobile`

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lidarview_core::{ColorMode, DeviceClass, PerformanceProfile};
use lidarview_io::{ingest_files, IngestOptions, ProgressEvent};
use lidarview_visualization::CameraPathSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Device {
    Mobile,
    Tablet,
    Desktop,
}

impl From<Device> for DeviceClass {
    fn from(device: Device) -> Self {
        match device {
            Device::Mobile => DeviceClass::Mobile,
            Device::Tablet => DeviceClass::Tablet,
            Device::Desktop => DeviceClass::Desktop,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Merge LAS/LAZ files and summarize the resulting dataset")]
struct Args {
    /// LAS or LAZ files, merged in the order given
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Device profile supplying the decimation stride
    #[arg(long, value_enum, default_value_t = Device::Desktop)]
    device: Device,

    /// Override the profile's decimation stride
    #[arg(long)]
    stride: Option<usize>,

    /// Initial color mode (elevation, vaporwave, intensity, rgb, classification)
    #[arg(long, default_value = "elevation")]
    color_mode: ColorMode,
}

fn print_progress(event: &ProgressEvent) {
    let percent = (event.fraction * 100.0).round();
    match (event.file_index, event.file_count, &event.label) {
        (Some(i), Some(n), Some(label)) => eprintln!("[{percent:>3}%] {i}/{n} {label}"),
        _ => eprintln!("[{percent:>3}%]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let profile = PerformanceProfile::for_device(args.device.into());
    let mut options = IngestOptions::from_profile(&profile).with_color_mode(args.color_mode);
    if let Some(stride) = args.stride {
        options = options.with_stride(stride);
    }

    let outcome = ingest_files(&args.files, options, print_progress)
        .await
        .context("Failed to load point cloud")?;
    let dataset = &outcome.dataset;
    let bounds = dataset.bounds();

    println!("Point cloud summary");
    println!("===================");
    println!("Files loaded:   {}", outcome.loaded_count);
    println!("Points:         {}", dataset.total_points());
    println!("Stride:         1 in {}", options.decimation_stride);
    println!(
        "Bounds:         x [{:.2}, {:.2}]  y [{:.2}, {:.2}]  z [{:.2}, {:.2}]",
        bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y, bounds.min_z, bounds.max_z
    );
    println!("Intensity:      {}", if dataset.intensity().is_some() { "yes" } else { "no" });
    println!("RGB:            {}", if dataset.rgb().is_some() { "yes" } else { "no" });
    println!(
        "Color mode:     {} (rendered as {})",
        dataset.color_mode(),
        dataset.effective_color_mode()
    );

    if let Some(summary) = outcome.failure_summary() {
        println!("\nWarning: {summary}");
        for failure in &outcome.errors {
            println!("  {}: {}", failure.source, failure.error);
        }
    }
    for warning in &outcome.warnings {
        println!("Warning: {warning}");
    }

    println!("\nCamera paths:");
    for path in CameraPathSet::from_bounds(bounds).summaries() {
        println!("  {:<12} {} - {}", path.id, path.name, path.description);
    }

    Ok(())
}
