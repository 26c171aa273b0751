//! Axis-aligned boxes in play-field space
//!
//! Field coordinates put the origin at the top-left corner with y growing
//! downward, matching how obstacles are placed by percentage of height.

use glam::Vec2;

/// An axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Shrink every side by `padding`. Sizes never go negative; an
    /// over-shrunk box collapses onto its center.
    pub fn shrink(&self, padding: f32) -> Self {
        let size = (self.size - Vec2::splat(2.0 * padding)).max(Vec2::ZERO);
        Self {
            min: self.center() - size * 0.5,
            size,
        }
    }

    /// Overlap test. Boxes that share an edge count as touching.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min, self.max());
        let (b_min, b_max) = (other.min, other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }
}
