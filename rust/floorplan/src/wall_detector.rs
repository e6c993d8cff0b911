// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scanline wall detection for floor plan recognition
//!
//! The image is binarized, then scanned on a coarse grid: every
//! `scan_stride`-th row left to right, then every `scan_stride`-th column top
//! to bottom. Each run of wall ink longer than the minimum line length
//! becomes one axis-aligned wall. When nothing qualifies, four perimeter
//! walls inset from the image border are synthesized instead.

use crate::image_ops::{is_ink, threshold_dark};
use crate::types::{DetectionConfig, Point2D, Wall};
use image::GrayImage;
use tracing::debug;

/// Axis of a scan pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn id_prefix(self) -> &'static str {
        match self {
            Axis::Horizontal => "wall-h",
            Axis::Vertical => "wall-v",
        }
    }
}

/// Inclusive run of ink pixels found on one scanline
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScanRun {
    axis: Axis,
    /// Row for horizontal runs, column for vertical runs
    line: u32,
    first: u32,
    last: u32,
}

impl ScanRun {
    fn endpoints(&self) -> (Point2D, Point2D) {
        let line = f64::from(self.line);
        match self.axis {
            Axis::Horizontal => (
                Point2D::new(f64::from(self.first), line),
                Point2D::new(f64::from(self.last), line),
            ),
            Axis::Vertical => (
                Point2D::new(line, f64::from(self.first)),
                Point2D::new(line, f64::from(self.last)),
            ),
        }
    }
}

/// Main wall detection pass
///
/// Returns horizontal walls in row-major order followed by vertical walls in
/// column-major order. An empty result is not an error; see
/// [`detect_walls_with_fallback`].
pub fn detect_walls(grayscale: &GrayImage, config: &DetectionConfig) -> Vec<Wall> {
    let width = grayscale.width();
    let height = grayscale.height();

    let mask = threshold_dark(grayscale, config.dark_threshold);
    let min_line_length = config.min_line_length(width, height);

    let (horizontal, vertical) = scan_both_axes(&mask, min_line_length, config);

    debug!(
        width,
        height,
        min_line_length,
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        "Scanline pass complete"
    );

    horizontal
        .into_iter()
        .chain(vertical)
        .enumerate()
        .map(|(index, run)| {
            let (start, end) = run.endpoints();
            Wall::new(format!("{}-{}", run.axis.id_prefix(), index), start, end, config)
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn scan_both_axes(
    mask: &GrayImage,
    min_line_length: f64,
    config: &DetectionConfig,
) -> (Vec<ScanRun>, Vec<ScanRun>) {
    rayon::join(
        || scan_pass(mask, Axis::Horizontal, min_line_length, config),
        || scan_pass(mask, Axis::Vertical, min_line_length, config),
    )
}

#[cfg(not(feature = "parallel"))]
fn scan_both_axes(
    mask: &GrayImage,
    min_line_length: f64,
    config: &DetectionConfig,
) -> (Vec<ScanRun>, Vec<ScanRun>) {
    (
        scan_pass(mask, Axis::Horizontal, min_line_length, config),
        scan_pass(mask, Axis::Vertical, min_line_length, config),
    )
}

/// Scan every stride-th line along one axis
fn scan_pass(mask: &GrayImage, axis: Axis, min_line_length: f64, config: &DetectionConfig) -> Vec<ScanRun> {
    let (lines, span) = match axis {
        Axis::Horizontal => (mask.height(), mask.width()),
        Axis::Vertical => (mask.width(), mask.height()),
    };

    let mut runs = Vec::new();
    for line in scan_lines(lines, config) {
        let found = collect_runs(span, min_line_length, |i| match axis {
            Axis::Horizontal => is_ink(mask, i, line),
            Axis::Vertical => is_ink(mask, line, i),
        });
        runs.extend(found.into_iter().map(|(first, last)| ScanRun {
            axis,
            line,
            first,
            last,
        }));
    }
    runs
}

/// Indices of the scanlines visited along an axis of `extent` pixels
fn scan_lines(extent: u32, config: &DetectionConfig) -> impl Iterator<Item = u32> {
    let stride = config.scan_stride.max(1) as usize;
    let end = extent.saturating_sub(config.scan_margin);
    (config.scan_margin..end).step_by(stride)
}

/// Find inclusive `(first, last)` runs of `on` samples along one line
///
/// A run qualifies when its length is strictly greater than `min_length`.
/// Runs still open at the end of the line are closed there and kept.
fn collect_runs(span: u32, min_length: f64, is_on: impl Fn(u32) -> bool) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut start: Option<u32> = None;

    for i in 0..span {
        match (is_on(i), start) {
            (true, None) => start = Some(i),
            (false, Some(first)) => {
                if f64::from(i - first) > min_length {
                    runs.push((first, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }

    if let Some(first) = start {
        if f64::from(span - first) > min_length {
            runs.push((first, span - 1));
        }
    }

    runs
}

/// Synthesize a closed rectangle of four walls inset from the image edges
///
/// Order is top, bottom, left, right; shared corners coincide exactly.
pub fn perimeter_walls(width: u32, height: u32, config: &DetectionConfig) -> Vec<Wall> {
    let w = f64::from(width);
    let h = f64::from(height);
    let margin = w.min(h) * config.perimeter_margin_fraction;

    let top_left = Point2D::new(margin, margin);
    let top_right = Point2D::new(w - margin, margin);
    let bottom_left = Point2D::new(margin, h - margin);
    let bottom_right = Point2D::new(w - margin, h - margin);

    vec![
        Wall::new("wall-perimeter-top", top_left, top_right, config),
        Wall::new("wall-perimeter-bottom", bottom_left, bottom_right, config),
        Wall::new("wall-perimeter-left", top_left, bottom_left, config),
        Wall::new("wall-perimeter-right", top_right, bottom_right, config),
    ]
}

/// Detect walls, falling back to the inset perimeter when none are found
///
/// Never returns an empty list.
pub fn detect_walls_with_fallback(grayscale: &GrayImage, config: &DetectionConfig) -> Vec<Wall> {
    let walls = detect_walls(grayscale, config);
    if !walls.is_empty() {
        return walls;
    }

    debug!(
        width = grayscale.width(),
        height = grayscale.height(),
        "No wall runs found, using perimeter fallback"
    );
    perimeter_walls(grayscale.width(), grayscale.height(), config)
}
