//! Vantage
//!
//! Loads a point cloud, LAS file, pose track, pose-location set or PLY mesh,
//! fits it into the scene, applies rotations and scale, steps the flight
//! camera and prints a JSON summary of the result.

mod app;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use vantage_data::DataFormat;
use vantage_scene::Axis;

use crate::app::{AppError, RunOptions};
use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Binary points that may start with a u32 record count
    Bin,
    /// Binary points with no count prefix
    BinRaw,
    Las,
    Pose,
    Loc,
    Ply,
}

impl From<FormatArg> for DataFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bin => DataFormat::BinaryPoints {
                has_header_count: true,
            },
            FormatArg::BinRaw => DataFormat::BinaryPoints {
                has_header_count: false,
            },
            FormatArg::Las => DataFormat::Las,
            FormatArg::Pose => DataFormat::PoseTrack,
            FormatArg::Loc => DataFormat::PoseLocations,
            FormatArg::Ply => DataFormat::PlyMesh,
        }
    }
}

/// Vantage - spatial dataset loader and flight-camera driver
#[derive(Parser, Debug)]
#[command(name = "vantage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset to load
    file: PathBuf,

    /// Decoder to use (guessed from the extension when omitted)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// JSON viewer config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Quarter turn about a local axis (x, y or z); repeatable
    #[arg(short, long)]
    rotate: Vec<Axis>,

    /// User scale multiplier, clamped to the configured range
    #[arg(short, long)]
    scale: Option<f32>,

    /// Wheel delta applied before the first frame (negative zooms in)
    #[arg(long, allow_hyphen_values = true)]
    zoom: Option<f32>,

    /// Frames to simulate at 60 Hz
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Seconds to wait for the load
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    app::init_logging(&config.logging);

    let options = RunOptions {
        file: args.file,
        format: args.format.map(DataFormat::from),
        rotations: args.rotate,
        scale: args.scale,
        zoom: args.zoom,
        frames: args.frames,
        timeout: Duration::from_secs(args.timeout),
    };
    let summary = app::run(&config, &options)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
