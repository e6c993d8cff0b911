// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Convert a 2D floor plan image into wall and room geometry
//!
//! Writes the floor plan exchange record (or the render model in meters) as
//! JSON. With `--debug`, also saves a PNG with the detected walls and room
//! rectangles drawn over the source image.
//!
//! Usage:
//!   floorplan-to-model <image_path> [options]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use floorplan_geometry::render::RenderModel;
use floorplan_geometry::session::{AnalysisSession, SessionState};
use floorplan_geometry::upload::decode_candidate;
use floorplan_geometry::{DetectionConfig, FloorPlan, UploadCandidate, UploadLimits, WallOrientation};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Convert a floor plan image into walls, rooms and a pixels-per-meter scale.
#[derive(Parser)]
#[command(name = "floorplan-to-model", version)]
struct Args {
    /// Floor plan image (PNG or JPEG).
    image: PathBuf,

    /// Display name for the plan; defaults to the image file name without
    /// its extension.
    #[arg(long)]
    name: Option<String>,

    /// JSON file overriding detection constants. Missing fields keep
    /// their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave the base64 source snapshot out of the output.
    #[arg(long)]
    no_snapshot: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Emit the 3D render model (meters) instead of the floor plan record.
    #[arg(long)]
    render: bool,

    /// Save a debug overlay PNG (rooms and walls) next to the input image.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => DetectionConfig::default(),
    };
    if args.no_snapshot {
        config.embed_source_image = false;
    }

    let bytes = fs::read(&args.image)
        .with_context(|| format!("Cannot read image '{}'", args.image.display()))?;
    let candidate = UploadCandidate::new(file_name(&args.image), bytes);

    let mut session = AnalysisSession::new(config, UploadLimits::default());
    session.generate_named(vec![candidate.clone()], args.name.as_deref())?;
    let SessionState::Ready(plan) = session.state() else {
        bail!("Analysis did not produce a floor plan");
    };

    info!(
        id = %plan.id,
        scale = plan.scale,
        walls = plan.walls.len(),
        rooms = plan.rooms.len(),
        "Floor plan generated"
    );

    if args.debug {
        let image = decode_candidate(&candidate)?;
        let debug_path = debug_path(&args.image);
        draw_overlay(image.to_rgb8(), plan)
            .save(&debug_path)
            .with_context(|| format!("Cannot write debug image '{}'", debug_path.display()))?;
        info!(path = %debug_path.display(), "Debug overlay saved");
    }

    let json = if args.render {
        to_json(&RenderModel::from_floor_plan(plan), args.pretty)?
    } else {
        to_json(plan, args.pretty)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Cannot write output '{}'", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<DetectionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config '{}'", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn debug_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "floorplan".to_string());
    image_path.with_file_name(format!("{}_debug.png", stem))
}

/// Draw room rectangles in blue and walls colored by orientation
fn draw_overlay(mut canvas: RgbImage, plan: &FloorPlan) -> RgbImage {
    for room in &plan.rooms {
        let width = room.bounds.width.round().max(1.0) as u32;
        let height = room.bounds.height.round().max(1.0) as u32;
        let rect = imageproc::rect::Rect::at(room.bounds.x.round() as i32, room.bounds.y.round() as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(&mut canvas, rect, Rgb([0, 90, 255]));
    }

    for wall in &plan.walls {
        let color = match wall.orientation() {
            WallOrientation::Horizontal => Rgb([255, 0, 0]),
            WallOrientation::Vertical => Rgb([0, 170, 0]),
            WallOrientation::Oblique => Rgb([255, 0, 255]),
        };
        draw_line_segment_mut(
            &mut canvas,
            (wall.start.x as f32, wall.start.y as f32),
            (wall.end.x as f32, wall.end.y as f32),
            color,
        );
    }

    canvas
}
