// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render-space model in meters
//!
//! Converts a [`FloorPlan`] into axis-aligned boxes a scene graph can place
//! directly: one box per wall, one floor slab per room plus a furniture set
//! chosen by room type. Pixel coordinates are divided by the plan scale and
//! recentred on the walls' bounding box. Image `y` maps to scene `z`; scene
//! `y` is up.

use crate::room_partitioner::wall_bounds;
use crate::types::{FloorPlan, Point2D, Room, RoomType, Wall};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

const MIN_WALL_LENGTH: f64 = 0.1;
const MIN_WALL_HEIGHT: f64 = 0.1;
const MIN_WALL_THICKNESS: f64 = 0.05;
const MIN_FLOOR_SIDE: f64 = 0.5;
const FLOOR_THICKNESS: f64 = 0.02;

const WALL_COLOR: &str = "hsl(210, 15%, 88%)";
const WOOD: &str = "hsl(25, 30%, 45%)";
const LIGHT_WOOD: &str = "hsl(30, 20%, 70%)";
const DARK: &str = "hsl(210, 10%, 30%)";
const PORCELAIN: &str = "hsl(0, 0%, 92%)";

/// Box primitive centred at `center`, rotated about the vertical axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub label: String,
    /// Scene coordinates `[x, y, z]` in meters
    pub center: [f64; 3],
    /// Extents `[x, y, z]` in meters before rotation
    pub size: [f64; 3],
    /// Rotation about the vertical axis in radians
    pub rotation_y: f64,
    pub color: String,
}

impl Block {
    fn new(label: &str, center: Point3<f64>, size: Vector3<f64>, color: &str) -> Self {
        Self {
            label: label.to_string(),
            center: [center.x, center.y, center.z],
            size: [size.x, size.y, size.z],
            rotation_y: 0.0,
            color: color.to_string(),
        }
    }
}

/// Floor slab and furnishings of one room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomFloor {
    pub room_id: String,
    pub name: String,
    pub room_type: RoomType,
    pub slab: Block,
    pub furniture: Vec<Block>,
}

/// Everything the scene needs for one floor plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderModel {
    pub title: String,
    pub subtitle: Option<String>,
    pub walls: Vec<Block>,
    pub floors: Vec<RoomFloor>,
    /// True for the built-in structure shown before any analysis
    pub is_default: bool,
}

impl RenderModel {
    /// Model for the current plan, or the default structure when there is none
    pub fn for_plan(plan: Option<&FloorPlan>) -> Self {
        plan.map_or_else(Self::default_structure, Self::from_floor_plan)
    }

    pub fn from_floor_plan(plan: &FloorPlan) -> Self {
        let scale = if plan.scale > 0.0 { plan.scale } else { 1.0 };
        let offset = wall_bounds(&plan.walls)
            .map(|b| b.center().to_nalgebra().coords / scale)
            .unwrap_or_else(Vector2::zeros);

        let walls = plan.walls.iter().map(|w| wall_block(w, scale, &offset)).collect();
        let floors = plan.rooms.iter().map(|r| room_floor(r, scale, &offset)).collect();

        Self {
            title: plan.name.clone(),
            subtitle: Some(format!("{} rooms • {} walls", plan.rooms.len(), plan.walls.len())),
            walls,
            floors,
            is_default: false,
        }
    }

    /// Simple 8 m × 6 m house with two interior dividers
    pub fn default_structure() -> Self {
        let wall = |label: &str, x: f64, z: f64, sx: f64, sz: f64| {
            Block::new(label, Point3::new(x, 1.5, z), Vector3::new(sx, 3.0, sz), WALL_COLOR)
        };

        let walls = vec![
            wall("front", 0.0, -3.0, 8.0, 0.2),
            wall("back", 0.0, 3.0, 8.0, 0.2),
            wall("left", -4.0, 0.0, 0.2, 6.0),
            wall("right", 4.0, 0.0, 0.2, 6.0),
            wall("divider", 0.0, 0.0, 0.1, 4.0),
            wall("divider", -2.0, 1.0, 4.0, 0.1),
        ];

        let slab = Block::new(
            "floor",
            Point3::new(0.0, -0.1, 0.0),
            Vector3::new(8.0, 0.2, 6.0),
            "hsl(215, 16%, 87%)",
        );

        Self {
            title: "Upload floor plan to generate 3D model".to_string(),
            subtitle: None,
            walls,
            floors: vec![RoomFloor {
                room_id: "default".to_string(),
                name: "House".to_string(),
                room_type: RoomType::Other,
                slab,
                furniture: Vec::new(),
            }],
            is_default: true,
        }
    }
}

/// Project a pixel point into the ground plane (x, z) in meters
fn to_ground(point: &Point2D, scale: f64, offset: &Vector2<f64>) -> Point2<f64> {
    point.to_nalgebra() / scale - offset
}

fn wall_block(wall: &Wall, scale: f64, offset: &Vector2<f64>) -> Block {
    let start = to_ground(&wall.start, scale, offset);
    let end = to_ground(&wall.end, scale, offset);
    let direction = end - start;
    let center = nalgebra::center(&start, &end);
    let height = wall.height.max(MIN_WALL_HEIGHT);

    Block {
        label: wall.id.clone(),
        center: [center.x, height / 2.0, center.y],
        size: [
            (wall.length() / scale).max(MIN_WALL_LENGTH),
            height,
            wall.thickness.max(MIN_WALL_THICKNESS),
        ],
        rotation_y: direction.y.atan2(direction.x),
        color: WALL_COLOR.to_string(),
    }
}

fn room_floor(room: &Room, scale: f64, offset: &Vector2<f64>) -> RoomFloor {
    let ground = to_ground(&room.bounds.center(), scale, offset);
    let size = Vector2::new(
        (room.bounds.width / scale).max(MIN_FLOOR_SIDE),
        (room.bounds.height / scale).max(MIN_FLOOR_SIDE),
    );

    let slab = Block::new(
        &room.name,
        Point3::new(ground.x, -FLOOR_THICKNESS / 2.0, ground.y),
        Vector3::new(size.x, FLOOR_THICKNESS, size.y),
        floor_color(room.room_type),
    );

    RoomFloor {
        room_id: room.id.clone(),
        name: room.name.clone(),
        room_type: room.room_type,
        slab,
        furniture: furniture_layout(room.room_type, ground, size),
    }
}

/// Floor tint per room type
pub fn floor_color(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::Living => "hsl(210, 100%, 95%)",
        RoomType::Bedroom => "hsl(320, 100%, 96%)",
        RoomType::Kitchen => "hsl(140, 80%, 92%)",
        RoomType::Bathroom => "hsl(45, 100%, 90%)",
        RoomType::Hallway => "hsl(220, 14%, 96%)",
        RoomType::Other => "hsl(210, 20%, 95%)",
    }
}

/// Furniture boxes for a room centred at `c` with floor size `s` (x, z)
pub fn furniture_layout(room_type: RoomType, c: Point2<f64>, s: Vector2<f64>) -> Vec<Block> {
    let at = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
    let dims = |x: f64, y: f64, z: f64| Vector3::new(x, y, z);
    let (w, d) = (s.x, s.y);

    match room_type {
        RoomType::Bedroom => {
            let bed_w = (w * 0.5).min(2.0);
            let bed_d = (d * 0.35).min(1.6);
            let x = c.x - w / 2.0 + bed_w / 2.0 + 0.2;
            let z = c.y - d / 2.0 + bed_d / 2.0 + 0.2;
            vec![
                Block::new("bed frame", at(x, 0.15, z), dims(bed_w, 0.3, bed_d), WOOD),
                Block::new("mattress", at(x, 0.35, z), dims(bed_w * 0.98, 0.2, bed_d * 0.96), "hsl(0, 0%, 98%)"),
                Block::new("nightstand", at(x - bed_w / 2.0 - 0.25, 0.25, z), dims(0.4, 0.5, 0.4), WOOD),
                Block::new("nightstand", at(x + bed_w / 2.0 + 0.25, 0.25, z), dims(0.4, 0.5, 0.4), WOOD),
            ]
        }
        RoomType::Living => {
            let sofa_w = (w * 0.5).min(2.2);
            let sofa_d = 0.8;
            let table = (w.min(d) * 0.24).min(1.0);
            vec![
                Block::new(
                    "sofa",
                    at(c.x - w / 2.0 + sofa_w / 2.0 + 0.3, 0.45, c.y + d / 2.0 - sofa_d / 2.0 - 0.3),
                    dims(sofa_w, 0.9, sofa_d),
                    "hsl(210, 10%, 35%)",
                ),
                Block::new("coffee table", at(c.x, 0.25, c.y), dims(table, 0.5, table), LIGHT_WOOD),
                Block::new("tv stand", at(c.x + w / 2.0 - 0.3, 0.3, c.y), dims(0.6, 0.6, 1.2), "hsl(210, 10%, 20%)"),
            ]
        }
        RoomType::Kitchen => {
            let counter_len = (w * 0.8).min(3.0);
            let counter_depth = 0.6;
            let z = c.y - d / 2.0 + counter_depth / 2.0 + 0.2;
            vec![
                Block::new("countertop", at(c.x, 0.95, z), dims(counter_len, 0.1, counter_depth), LIGHT_WOOD),
                Block::new("cabinets", at(c.x, 0.45, z), dims(counter_len, 0.8, counter_depth), DARK),
                Block::new(
                    "island",
                    at(c.x - w * 0.15, 0.85, c.y),
                    dims((w * 0.3).min(1.8), 0.7, (d * 0.25).min(1.0)),
                    DARK,
                ),
            ]
        }
        RoomType::Bathroom => {
            let tub_w = (w * 0.6).min(1.6);
            let tub_d = 0.7;
            vec![
                Block::new(
                    "bathtub",
                    at(c.x - w / 2.0 + tub_w / 2.0 + 0.2, 0.45, c.y + d / 2.0 - tub_d / 2.0 - 0.2),
                    dims(tub_w, 0.5, tub_d),
                    PORCELAIN,
                ),
                Block::new("sink", at(c.x + w / 2.0 - 0.4, 0.9, c.y), dims(0.6, 0.2, 0.4), "hsl(0, 0%, 95%)"),
                Block::new("vanity", at(c.x + w / 2.0 - 0.4, 0.5, c.y), dims(0.5, 0.6, 0.35), DARK),
                Block::new("toilet", at(c.x, 0.4, c.y - d / 2.0 + 0.4), dims(0.44, 0.5, 0.44), PORCELAIN),
            ]
        }
        RoomType::Hallway | RoomType::Other => {
            vec![Block::new("table", at(c.x, 0.7, c.y), dims(1.2, 0.1, 0.7), LIGHT_WOOD)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectionConfig, Point2D, Rect};
    use approx::assert_relative_eq;

    fn plan() -> FloorPlan {
        let config = DetectionConfig::default();
        let walls = vec![
            Wall::new("top", Point2D::new(0.0, 0.0), Point2D::new(400.0, 0.0), &config),
            Wall::new("left", Point2D::new(0.0, 0.0), Point2D::new(0.0, 200.0), &config),
        ];
        FloorPlan {
            id: "plan-1".into(),
            name: "test".into(),
            rooms: vec![Room {
                id: "room-1".into(),
                name: "Kitchen".into(),
                room_type: RoomType::Kitchen,
                bounds: Rect::new(0.0, 0.0, 200.0, 100.0),
                walls: walls.clone(),
            }],
            walls,
            scale: 20.0,
            original_image: None,
        }
    }

    #[test]
    fn test_walls_are_scaled_and_centred() {
        let model = RenderModel::from_floor_plan(&plan());

        // Bounds 400 x 200 px at 20 px/m: centre (10 m, 5 m)
        let top = &model.walls[0];
        assert_relative_eq!(top.center[0], 0.0);
        assert_relative_eq!(top.center[2], -5.0);
        assert_relative_eq!(top.center[1], 1.5);
        assert_relative_eq!(top.size[0], 20.0);
        assert_relative_eq!(top.rotation_y, 0.0);

        let left = &model.walls[1];
        assert_relative_eq!(left.center[0], -10.0);
        assert_relative_eq!(left.size[0], 10.0);
        assert_relative_eq!(left.rotation_y, std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_room_floor_dimensions() {
        let model = RenderModel::from_floor_plan(&plan());
        let floor = &model.floors[0];

        assert_relative_eq!(floor.slab.size[0], 10.0);
        assert_relative_eq!(floor.slab.size[2], 5.0);
        assert_relative_eq!(floor.slab.center[0], -5.0);
        assert_relative_eq!(floor.slab.center[2], -2.5);
        assert_eq!(floor.slab.color, floor_color(RoomType::Kitchen));
        assert_eq!(floor.furniture.len(), 3);
        assert_eq!(model.subtitle.as_deref(), Some("1 rooms • 2 walls"));
    }

    #[test]
    fn test_minimum_visible_dimensions() {
        let mut tiny = plan();
        tiny.walls[0].end = tiny.walls[0].start;
        tiny.walls[0].thickness = 0.0;
        tiny.rooms[0].bounds = Rect::new(0.0, 0.0, 1.0, 1.0);

        let model = RenderModel::from_floor_plan(&tiny);

        assert_relative_eq!(model.walls[0].size[0], MIN_WALL_LENGTH);
        assert_relative_eq!(model.walls[0].size[2], MIN_WALL_THICKNESS);
        assert_relative_eq!(model.floors[0].slab.size[0], MIN_FLOOR_SIDE);
    }

    #[test]
    fn test_absent_plan_uses_default_structure() {
        let model = RenderModel::for_plan(None);

        assert!(model.is_default);
        assert_eq!(model.walls.len(), 6);
        assert_eq!(model.floors.len(), 1);

        let from_plan = RenderModel::for_plan(Some(&plan()));
        assert!(!from_plan.is_default);
        assert_eq!(from_plan.title, "test");
    }

    #[test]
    fn test_every_room_type_has_furniture() {
        let c = Point2::new(0.0, 0.0);
        let s = Vector2::new(4.0, 3.0);
        for room_type in RoomType::ALL {
            assert!(!furniture_layout(room_type, c, s).is_empty(), "{room_type}");
        }
    }
}
