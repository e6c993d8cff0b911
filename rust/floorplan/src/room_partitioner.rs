// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room partitioning from fixed proportional templates
//!
//! Rooms are not traced from wall geometry. The effective bounding box (the
//! walls' extent, or an image-derived box when the walls are degenerate) is
//! cut by an ordered list of [`RoomTemplate`]s, undersized rooms are dropped,
//! and each surviving room is handed the walls whose midpoints lie near it.

use crate::types::{DetectionConfig, Rect, Room, RoomTemplate, RoomType, Wall};
use tracing::debug;

/// Bounding box of all wall endpoints, `None` for an empty wall list
pub fn wall_bounds(walls: &[Wall]) -> Option<Rect> {
    let mut points = walls.iter().flat_map(|w| [w.start, w.end]);
    let first = points.next()?;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Box derived from the image alone: inset margin, fixed extent
pub fn image_bounds(image_width: u32, image_height: u32, config: &DetectionConfig) -> Rect {
    let w = f64::from(image_width);
    let h = f64::from(image_height);
    Rect::new(
        w * config.effective_margin_fraction,
        h * config.effective_margin_fraction,
        w * config.effective_extent_fraction,
        h * config.effective_extent_fraction,
    )
}

/// Region the templates are applied to
///
/// The walls' bounding box is used unless it spans less than
/// `min_coverage_fraction` of the image on either axis.
pub fn effective_bounds(walls: &[Wall], image_width: u32, image_height: u32, config: &DetectionConfig) -> Rect {
    let min_width = f64::from(image_width) * config.min_coverage_fraction;
    let min_height = f64::from(image_height) * config.min_coverage_fraction;

    match wall_bounds(walls) {
        Some(bounds) if bounds.width >= min_width && bounds.height >= min_height => bounds,
        Some(bounds) => {
            debug!(
                width = bounds.width,
                height = bounds.height,
                min_width,
                min_height,
                "Wall bounds too small, using image-derived bounds"
            );
            image_bounds(image_width, image_height, config)
        }
        None => image_bounds(image_width, image_height, config),
    }
}

/// Smallest side a templated room may have
pub fn min_room_size(area: &Rect, config: &DetectionConfig) -> f64 {
    (area.width.min(area.height) * config.min_room_fraction).max(config.min_room_floor_px)
}

/// Partition the floor plan into templated rooms
///
/// Never returns an empty list: an empty wall list or a layout too small
/// for every template yields a single default living room.
pub fn partition_rooms(walls: &[Wall], image_width: u32, image_height: u32, config: &DetectionConfig) -> Vec<Room> {
    if walls.is_empty() {
        debug!("No walls to partition, emitting default room");
        return vec![default_room(image_width, image_height, config, Vec::new())];
    }

    let area = effective_bounds(walls, image_width, image_height, config);
    let min_size = min_room_size(&area, config);

    let mut rooms = Vec::with_capacity(config.room_templates.len());
    for (template_index, template) in config.room_templates.iter().enumerate() {
        let bounds = template.apply(&area);
        if bounds.width <= min_size || bounds.height <= min_size {
            debug!(
                room = %template.name,
                width = bounds.width,
                height = bounds.height,
                min_size,
                "Skipping undersized room template"
            );
            continue;
        }

        rooms.push(Room {
            id: format!("room-{}", rooms.len() + 1),
            name: template.name.clone(),
            room_type: template.room_type,
            bounds,
            walls: assign_walls(&bounds, template_index, walls, config),
        });
    }

    if rooms.is_empty() {
        debug!(min_size, "Every room template undersized, emitting default room");
        let mut room = default_room(image_width, image_height, config, Vec::new());
        room.walls = assign_walls(&room.bounds, 0, walls, config);
        rooms.push(room);
    }

    rooms
}

/// Single living room covering the image-derived box
fn default_room(image_width: u32, image_height: u32, config: &DetectionConfig, walls: Vec<Wall>) -> Room {
    let template = RoomTemplate::new("Living Room", RoomType::Living, 0.0, 0.0, 1.0, 1.0);
    Room {
        id: "room-1".to_string(),
        name: template.name.clone(),
        room_type: template.room_type,
        bounds: template.apply(&image_bounds(image_width, image_height, config)),
        walls,
    }
}

/// Walls whose midpoint lies within the room bounds grown by the assignment
/// tolerance, or the modulo fallback subset when none do
fn assign_walls(bounds: &Rect, template_index: usize, walls: &[Wall], config: &DetectionConfig) -> Vec<Wall> {
    let zone = bounds.expanded(config.wall_assign_tolerance);
    let nearby: Vec<Wall> = walls
        .iter()
        .filter(|wall| zone.contains(&wall.midpoint()))
        .cloned()
        .collect();

    if !nearby.is_empty() || walls.is_empty() {
        return nearby;
    }

    fallback_walls(template_index, walls, config.fallback_wall_stride)
}

/// Every `stride`-th wall, offset by the template index
///
/// The offset wraps around the wall count so short wall lists still yield
/// at least one wall.
fn fallback_walls(template_index: usize, walls: &[Wall], stride: usize) -> Vec<Wall> {
    let stride = stride.max(1);
    let offset = (template_index % stride) % walls.len().max(1);

    walls
        .iter()
        .enumerate()
        .filter(|(i, _)| i % stride == offset)
        .map(|(_, wall)| wall.clone())
        .collect()
}
