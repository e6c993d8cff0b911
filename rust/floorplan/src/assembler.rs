// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Final packaging of detected geometry into a [`FloorPlan`]

use crate::types::{DetectionConfig, FloorPlan, PlanGeometry};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::warn;
use web_time::{SystemTime, UNIX_EPOCH};

/// Real-world extent used when the configured reference is not positive
pub const DEFAULT_REFERENCE_METERS: f64 = 20.0;

/// Pixels per meter, assuming the shorter image side spans
/// `reference_meters`
pub fn compute_scale(image_width: u32, image_height: u32, config: &DetectionConfig) -> f64 {
    let reference = if config.reference_meters > 0.0 {
        config.reference_meters
    } else {
        DEFAULT_REFERENCE_METERS
    };
    f64::from(image_width.min(image_height)) / reference
}

/// Strip the trailing extension from a file name
///
/// Only the last dot of the final path component counts, and a leading dot
/// (hidden file) is not an extension.
pub fn display_name(filename: &str) -> String {
    let component_start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match filename[component_start..].rfind('.') {
        Some(dot) if dot > 0 => filename[..component_start + dot].to_string(),
        _ => filename.to_string(),
    }
}

/// Time-derived plan identifier
pub fn plan_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("plan-{}", millis)
}

/// Encode the source image as a PNG data URL
pub fn encode_snapshot(image: &DynamicImage) -> Result<String, image::ImageError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Combine detected geometry and metadata into the exchange record
///
/// `source` is only used for the embedded snapshot. Snapshot encoding
/// failures are logged and leave `original_image` empty.
pub fn assemble_floor_plan(
    geometry: PlanGeometry,
    display_filename: &str,
    source: Option<&DynamicImage>,
    config: &DetectionConfig,
) -> FloorPlan {
    let original_image = match source {
        Some(image) if config.embed_source_image => match encode_snapshot(image) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Could not encode source image snapshot");
                None
            }
        },
        _ => None,
    };

    FloorPlan {
        id: plan_id(),
        name: display_name(display_filename),
        scale: compute_scale(geometry.image_width, geometry.image_height, config),
        rooms: geometry.rooms,
        walls: geometry.walls,
        original_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_display_name_strips_trailing_extension() {
        assert_eq!(display_name("house.png"), "house");
        assert_eq!(display_name("my.house.plan.jpeg"), "my.house.plan");
        assert_eq!(display_name("no_extension"), "no_extension");
        assert_eq!(display_name(".hidden"), ".hidden");
        assert_eq!(display_name("scans.v2/ground floor"), "scans.v2/ground floor");
        assert_eq!(display_name("scans/ground.png"), "scans/ground");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_compute_scale() {
        let config = DetectionConfig::default();
        assert_eq!(compute_scale(1000, 800, &config), 40.0);
        assert_eq!(compute_scale(1, 1, &config), 0.05);

        let broken = DetectionConfig {
            reference_meters: 0.0,
            ..Default::default()
        };
        assert_eq!(compute_scale(400, 400, &broken), 20.0);
    }

    #[test]
    fn test_plan_id_prefix() {
        let id = plan_id();
        assert!(id.starts_with("plan-"));
        assert!(id["plan-".len()..].parse::<u128>().is_ok());
    }

    #[test]
    fn test_snapshot_is_png_data_url() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([200])));
        let url = encode_snapshot(&image).unwrap();

        assert!(url.starts_with("data:image/png;base64,"));
        let payload = STANDARD.decode(&url["data:image/png;base64,".len()..]).unwrap();
        assert_eq!(&payload[1..4], b"PNG");
    }

    #[test]
    fn test_assemble_respects_snapshot_flag() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([255])));
        let geometry = PlanGeometry {
            walls: vec![],
            rooms: vec![],
            image_width: 10,
            image_height: 10,
        };

        let with = assemble_floor_plan(geometry.clone(), "a.png", Some(&image), &DetectionConfig::default());
        assert!(with.original_image.is_some());
        assert_eq!(with.name, "a");

        let config = DetectionConfig {
            embed_source_image: false,
            ..Default::default()
        };
        let without = assemble_floor_plan(geometry, "a.png", Some(&image), &config);
        assert!(without.original_image.is_none());
    }
}
