// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan image to wall and room geometry
//!
//! This crate turns a raster floor plan into a simplified geometric model:
//! 1. Grayscale sampling (unweighted channel mean)
//! 2. Wall detection by coarse scanline thresholding, with a perimeter
//!    fallback when no lines are found
//! 3. Room partitioning from fixed proportional templates
//! 4. Assembly into a [`FloorPlan`] with a pixels-per-meter scale
//!
//! The pipeline is a pure, synchronous function of one image and never fails
//! for image-content reasons. Upload filtering and decoding live in
//! [`upload`]; [`session`] models the application state around it and
//! [`render`] converts results into meters for a 3D scene.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_geometry::{analyze, render::RenderModel};
//!
//! let image = image::open("ground_floor.png")?;
//! let plan = analyze(&image, "ground_floor.png");
//! let scene = RenderModel::from_floor_plan(&plan);
//! ```

pub mod assembler;
pub mod error;
pub mod image_ops;
pub mod render;
pub mod room_partitioner;
pub mod session;
pub mod types;
pub mod upload;
pub mod wall_detector;

// Re-export commonly used types and functions
pub use assembler::{assemble_floor_plan, compute_scale, display_name};
pub use error::{InputError, Result};
pub use image_ops::{dynamic_to_grayscale, rgba_to_grayscale};
pub use room_partitioner::{effective_bounds, partition_rooms};
pub use session::{AnalysisSession, SessionState};
pub use types::{
    DetectionConfig, FloorPlan, PlanGeometry, Point2D, Rect, Room, RoomTemplate, RoomType, Wall,
    WallOrientation,
};
pub use upload::{UploadCandidate, UploadLimits};
pub use wall_detector::{detect_walls, detect_walls_with_fallback, perimeter_walls};

use image::{DynamicImage, GrayImage};
use tracing::info;

/// Detect walls and rooms in a grayscale floor plan image
///
/// Runs wall detection (with perimeter fallback) followed by room
/// partitioning against the image dimensions.
pub fn detect_geometry(grayscale: &GrayImage, config: &DetectionConfig) -> PlanGeometry {
    let width = grayscale.width();
    let height = grayscale.height();

    let walls = detect_walls_with_fallback(grayscale, config);
    let rooms = partition_rooms(&walls, width, height, config);

    PlanGeometry {
        walls,
        rooms,
        image_width: width,
        image_height: height,
    }
}

/// Analyze a decoded image with the default configuration
pub fn analyze(image: &DynamicImage, display_filename: &str) -> FloorPlan {
    analyze_with_config(image, display_filename, &DetectionConfig::default())
}

/// Analyze a decoded image
///
/// # Arguments
///
/// * `image` - Decoded floor plan raster
/// * `display_filename` - Source file name; its extension is stripped for the plan name
/// * `config` - Heuristic constants
pub fn analyze_with_config(image: &DynamicImage, display_filename: &str, config: &DetectionConfig) -> FloorPlan {
    let grayscale = dynamic_to_grayscale(image);
    let geometry = detect_geometry(&grayscale, config);
    log_summary(display_filename, &geometry);
    assemble_floor_plan(geometry, display_filename, Some(image), config)
}

/// Analyze raw RGBA pixel data (4 bytes per pixel)
///
/// Pixels missing from a short buffer count as background, and the snapshot
/// is only embedded when the buffer holds the full image.
pub fn analyze_rgba(
    rgba_data: &[u8],
    width: u32,
    height: u32,
    display_filename: &str,
    config: &DetectionConfig,
) -> FloorPlan {
    let grayscale = rgba_to_grayscale(rgba_data, width, height);
    let geometry = detect_geometry(&grayscale, config);
    log_summary(display_filename, &geometry);

    let source = config
        .embed_source_image
        .then(|| image::RgbaImage::from_raw(width, height, rgba_data.to_vec()))
        .flatten()
        .map(DynamicImage::ImageRgba8);
    assemble_floor_plan(geometry, display_filename, source.as_ref(), config)
}

fn log_summary(display_filename: &str, geometry: &PlanGeometry) {
    info!(
        file = display_filename,
        width = geometry.image_width,
        height = geometry.image_height,
        walls = geometry.walls.len(),
        rooms = geometry.rooms.len(),
        "Floor plan analyzed"
    );
}
