// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan geometry extraction
//!
//! [`FloorPlan`] and the records it contains serialize to the JSON exchange
//! format consumed by the rendering layer (`originalImage`, room `type`).

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in source image pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Orientation of a wall segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallOrientation {
    Horizontal,
    Vertical,
    Oblique,
}

/// Straight wall segment with fixed real-world construction constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub id: String,
    pub start: Point2D,
    pub end: Point2D,
    /// Wall height in meters
    pub height: f64,
    /// Wall thickness in meters
    pub thickness: f64,
}

impl Wall {
    pub fn new(id: impl Into<String>, start: Point2D, end: Point2D, config: &DetectionConfig) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            height: config.wall_height,
            thickness: config.wall_thickness,
        }
    }

    /// Length in pixels
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    pub fn orientation(&self) -> WallOrientation {
        if self.start.y == self.end.y {
            WallOrientation::Horizontal
        } else if self.start.x == self.end.x {
            WallOrientation::Vertical
        } else {
            WallOrientation::Oblique
        }
    }
}

/// Semantic room classification
///
/// Closed set: any label that is not one of the known types deserializes
/// as [`RoomType::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RoomType {
    Living,
    Bedroom,
    Kitchen,
    Bathroom,
    Hallway,
    Other,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::Living,
        RoomType::Bedroom,
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::Hallway,
        RoomType::Other,
    ];

    /// Resolve a free-form label, case-insensitively
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "living" => RoomType::Living,
            "bedroom" => RoomType::Bedroom,
            "kitchen" => RoomType::Kitchen,
            "bathroom" => RoomType::Bathroom,
            "hallway" => RoomType::Hallway,
            _ => RoomType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Living => "living",
            RoomType::Bedroom => "bedroom",
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
            RoomType::Hallway => "hallway",
            RoomType::Other => "other",
        }
    }
}

impl From<String> for RoomType {
    fn from(label: String) -> Self {
        RoomType::from_label(&label)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rectangle by `margin` on all four sides
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &Point2D) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }
}

/// Rectangular labelled partition of the floor plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub bounds: Rect,
    /// Walls assigned to this room by proximity (not a physical boundary)
    pub walls: Vec<Wall>,
}

/// Complete extraction result handed to the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    pub id: String,
    pub name: String,
    pub rooms: Vec<Room>,
    pub walls: Vec<Wall>,
    /// Pixels per meter
    pub scale: f64,
    /// Self-contained data URL of the source image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
}

/// Walls and rooms extracted from one image, before assembly
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGeometry {
    pub walls: Vec<Wall>,
    pub rooms: Vec<Room>,
    pub image_width: u32,
    pub image_height: u32,
}

/// One proportional room rectangle applied during partitioning
///
/// `x`, `y`, `width` and `height` are fractions of the effective bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomTemplate {
    pub name: String,
    pub room_type: RoomType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomTemplate {
    pub fn new(name: &str, room_type: RoomType, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.to_string(),
            room_type,
            x,
            y,
            width,
            height,
        }
    }

    /// Project the template onto a concrete bounding box
    pub fn apply(&self, area: &Rect) -> Rect {
        Rect::new(
            area.x + area.width * self.x,
            area.y + area.height * self.y,
            area.width * self.width,
            area.height * self.height,
        )
    }

    /// The fixed layout: main living area on the left, kitchen and bedroom
    /// stacked on the right, bathroom and hallway splitting the bottom strip
    pub fn default_layout() -> Vec<RoomTemplate> {
        vec![
            RoomTemplate::new("Living Room", RoomType::Living, 0.0, 0.0, 0.65, 0.7),
            RoomTemplate::new("Kitchen", RoomType::Kitchen, 0.65, 0.0, 0.35, 0.35),
            RoomTemplate::new("Bedroom", RoomType::Bedroom, 0.65, 0.35, 0.35, 0.35),
            RoomTemplate::new("Bathroom", RoomType::Bathroom, 0.0, 0.7, 0.35, 0.3),
            RoomTemplate::new("Hallway", RoomType::Hallway, 0.35, 0.7, 0.65, 0.3),
        ]
    }
}

/// Every tunable constant of the extraction pipeline
///
/// Partial JSON documents are accepted; missing fields keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Pixels with grayscale strictly below this value count as wall ink
    pub dark_threshold: u8,
    /// Row/column step of the scanline passes
    pub scan_stride: u32,
    /// Rows/columns skipped at both ends of each pass
    pub scan_margin: u32,
    /// Minimum run length as a fraction of min(width, height)
    pub min_line_fraction: f64,
    /// Wall height in meters
    pub wall_height: f64,
    /// Wall thickness in meters
    pub wall_thickness: f64,
    /// Perimeter fallback inset as a fraction of min(width, height)
    pub perimeter_margin_fraction: f64,
    /// Wall bounding box must span at least this fraction of the image on
    /// both axes, otherwise the image-derived box is used
    pub min_coverage_fraction: f64,
    /// Inset of the image-derived effective box
    pub effective_margin_fraction: f64,
    /// Extent of the image-derived effective box
    pub effective_extent_fraction: f64,
    /// Minimum room side as a fraction of min(effective width, height)
    pub min_room_fraction: f64,
    /// Absolute lower bound for the minimum room side (pixels)
    pub min_room_floor_px: f64,
    /// Expansion of room bounds when matching wall midpoints (pixels)
    pub wall_assign_tolerance: f64,
    /// Modulus of the deterministic wall assignment fallback
    pub fallback_wall_stride: usize,
    /// Real-world extent of the shorter image side, used to derive the scale
    pub reference_meters: f64,
    /// Embed a PNG data URL of the source image in the result
    pub embed_source_image: bool,
    pub room_templates: Vec<RoomTemplate>,
}

impl DetectionConfig {
    /// Runs must be strictly longer than this to become walls
    pub fn min_line_length(&self, width: u32, height: u32) -> f64 {
        f64::from(width.min(height)) * self.min_line_fraction
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            dark_threshold: 100,
            scan_stride: 5,
            scan_margin: 0,
            min_line_fraction: 0.1,
            wall_height: 3.0,
            wall_thickness: 0.2,
            perimeter_margin_fraction: 0.1,
            min_coverage_fraction: 0.1,
            effective_margin_fraction: 0.1,
            effective_extent_fraction: 0.8,
            min_room_fraction: 0.1,
            min_room_floor_px: 4.0,
            wall_assign_tolerance: 20.0,
            fallback_wall_stride: 5,
            reference_meters: 20.0,
            embed_source_image: true,
            room_templates: RoomTemplate::default_layout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_unknown_label_is_other() {
        assert_eq!(RoomType::from_label("Kitchen"), RoomType::Kitchen);
        assert_eq!(RoomType::from_label("garage"), RoomType::Other);
        assert_eq!(RoomType::from_label(""), RoomType::Other);

        let parsed: RoomType = serde_json::from_str("\"sauna\"").unwrap();
        assert_eq!(parsed, RoomType::Other);
        assert_eq!(serde_json::to_string(&RoomType::Hallway).unwrap(), "\"hallway\"");
    }

    #[test]
    fn test_wall_orientation() {
        let config = DetectionConfig::default();
        let h = Wall::new("h", Point2D::new(0.0, 5.0), Point2D::new(10.0, 5.0), &config);
        let v = Wall::new("v", Point2D::new(3.0, 0.0), Point2D::new(3.0, 9.0), &config);
        let d = Wall::new("d", Point2D::new(0.0, 0.0), Point2D::new(4.0, 3.0), &config);

        assert_eq!(h.orientation(), WallOrientation::Horizontal);
        assert_eq!(v.orientation(), WallOrientation::Vertical);
        assert_eq!(d.orientation(), WallOrientation::Oblique);
        assert!((d.length() - 5.0).abs() < 1e-9);
        assert_eq!(h.midpoint(), Point2D::new(5.0, 5.0));
    }

    #[test]
    fn test_rect_expanded_contains() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let grown = rect.expanded(5.0);

        assert!(!rect.contains(&Point2D::new(7.0, 15.0)));
        assert!(grown.contains(&Point2D::new(7.0, 15.0)));
        assert!(grown.contains(&Point2D::new(35.0, 35.0)));
        assert!(!grown.contains(&Point2D::new(35.1, 20.0)));
    }

    #[test]
    fn test_floor_plan_json_shape() {
        let plan = FloorPlan {
            id: "plan-1".into(),
            name: "house".into(),
            rooms: vec![Room {
                id: "room-1".into(),
                name: "Kitchen".into(),
                room_type: RoomType::Kitchen,
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                walls: vec![],
            }],
            walls: vec![],
            scale: 40.0,
            original_image: Some("data:image/png;base64,".into()),
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("originalImage").is_some());
        assert_eq!(json["rooms"][0]["type"], "kitchen");

        let back: FloorPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: DetectionConfig = serde_json::from_str(r#"{"dark_threshold": 90}"#).unwrap();
        assert_eq!(config.dark_threshold, 90);
        assert_eq!(config.scan_stride, 5);
        assert_eq!(config.room_templates.len(), 5);
    }
}
