//! Axis-aligned box collision between the player and bullets
//!
//! Boxes touching edge-to-edge do not count as a hit.

use glam::Vec2;

use super::entity::{Bullet, Player};

/// Axis-aligned bounding box given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Square box of side `side`
    pub fn square(min: Vec2, side: f32) -> Self {
        Self::new(min, Vec2::splat(side))
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap test
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max().x
            && self.max().x > other.min.x
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }
}

/// Find the first bullet (in insertion order) overlapping the player.
///
/// Returns the bullet's id.
pub fn first_hit(player: &Player, bullets: &[Bullet], bullet_size: f32) -> Option<u32> {
    let player_box = Aabb::square(player.pos, player.size);
    bullets
        .iter()
        .find(|b| player_box.overlaps(&Aabb::square(b.pos, bullet_size)))
        .map(|b| b.id)
}
