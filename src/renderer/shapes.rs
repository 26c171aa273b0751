//! Shape generation for the play field
//!
//! Everything is an axis-aligned box in field pixels (top-left origin).

use glam::Vec2;

use super::vertex::{Vertex, colors, obstacle_color};
use crate::sim::{Aabb, Session, obstacle_hitbox, player_hitbox};

/// Height of the lit band at the top of the water
pub const SURFACE_BAND: f32 = 6.0;
/// Hitbox outline thickness
pub const OUTLINE_WIDTH: f32 = 2.0;

/// Two triangles covering `rect`
pub fn quad(rect: &Aabb, color: [f32; 4]) -> [Vertex; 6] {
    let Vec2 { x: x0, y: y0 } = rect.min;
    let Vec2 { x: x1, y: y1 } = rect.max();
    [
        Vertex::new(x0, y0, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x0, y1, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x1, y1, color),
    ]
}

/// Hollow rectangle drawn inside `rect`
pub fn outline(rect: &Aabb, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let width = width.min(rect.size.x / 2.0).min(rect.size.y / 2.0).max(0.0);
    if width == 0.0 {
        return Vec::new();
    }
    let min = rect.min;
    let size = rect.size;
    let edges = [
        Aabb::new(min, Vec2::new(size.x, width)),
        Aabb::new(Vec2::new(min.x, min.y + size.y - width), Vec2::new(size.x, width)),
        Aabb::new(Vec2::new(min.x, min.y + width), Vec2::new(width, size.y - 2.0 * width)),
        Aabb::new(
            Vec2::new(min.x + size.x - width, min.y + width),
            Vec2::new(width, size.y - 2.0 * width),
        ),
    ];
    edges.iter().flat_map(|edge| quad(edge, color)).collect()
}

/// Vertices for the whole field: surface band, obstacles, submarine, and
/// optionally the padded hitboxes used for collision
pub fn scene(session: &Session, show_hitboxes: bool) -> Vec<Vertex> {
    let tuning = session.tuning();
    let obstacles = session.obstacles();
    let player = session.player();

    let mut vertices = Vec::with_capacity((obstacles.len() + 2) * 6 * if show_hitboxes { 5 } else { 1 });

    let surface = Aabb::new(Vec2::ZERO, Vec2::new(tuning.field_width, SURFACE_BAND));
    vertices.extend(quad(&surface, colors::SURFACE));

    for obstacle in obstacles {
        vertices.extend(quad(&obstacle.bounds(), obstacle_color(obstacle.kind())));
    }
    vertices.extend(quad(&player.bounds(tuning), colors::SUBMARINE));

    if show_hitboxes {
        for obstacle in obstacles {
            vertices.extend(outline(&obstacle_hitbox(obstacle, tuning), OUTLINE_WIDTH, colors::HITBOX));
        }
        vertices.extend(outline(&player_hitbox(&player, tuning), OUTLINE_WIDTH, colors::HITBOX));
    }

    vertices
}
