//! Player and bullet motion
//!
//! Screen coordinates: origin at the arena's top-left corner, +y points down.
//! Positions are the top-left corner of each entity's box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four directional inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step for this direction in screen coordinates
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }
}

/// Which directions are currently held; any combination is allowed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldDirections {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Sum of the unit steps of every held direction (not normalized)
    pub fn step(&self) -> Vec2 {
        Direction::ALL
            .iter()
            .filter(|d| self.is_held(**d))
            .map(Direction::unit)
            .sum()
    }
}

/// Which way the player sprite faces (last horizontal input wins)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player's soul
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub facing: Facing,
}

impl Player {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size,
            facing: Facing::Right,
        }
    }

    /// Apply one frame of held input, then clamp to the arena
    pub fn advance(&mut self, held: &HeldDirections, speed: f32, arena: Vec2) {
        self.pos += held.step() * speed;
        if held.left && !held.right {
            self.facing = Facing::Left;
        } else if held.right && !held.left {
            self.facing = Facing::Right;
        }
        self.clamp_to(arena);
    }

    /// Keep the whole box inside `[0, arena]`
    pub fn clamp_to(&mut self, arena: Vec2) {
        let max = (arena - Vec2::splat(self.size)).max(Vec2::ZERO);
        self.pos = self.pos.clamp(Vec2::ZERO, max);
    }
}

/// Arena edge a bullet entered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}

/// A bullet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub edge: Edge,
}

impl Bullet {
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// True once the bullet has left the arena by more than `margin`
    pub fn is_outside(&self, arena: Vec2, margin: f32) -> bool {
        self.pos.x < -margin
            || self.pos.y < -margin
            || self.pos.x > arena.x + margin
            || self.pos.y > arena.y + margin
    }
}

/// Advance every bullet one frame and drop the ones that left the arena.
///
/// Survivors keep their insertion order.
pub fn advance_bullets(bullets: &mut Vec<Bullet>, arena: Vec2, margin: f32) {
    for bullet in bullets.iter_mut() {
        bullet.advance();
    }
    bullets.retain(|b| !b.is_outside(arena, margin));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARENA: Vec2 = Vec2::new(500.0, 500.0);

    #[test]
    fn test_diagonal_is_sum_of_units() {
        let mut held = HeldDirections::default();
        held.set(Direction::Up, true);
        held.set(Direction::Left, true);
        assert_eq!(held.step(), Vec2::new(-1.0, -1.0));

        let mut player = Player::new(Vec2::new(250.0, 250.0), 15.0);
        player.advance(&held, 8.0, ARENA);
        assert_eq!(player.pos, Vec2::new(242.0, 242.0));
        assert_eq!(player.facing, Facing::Left);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let held = HeldDirections {
            up: true,
            down: true,
            left: false,
            right: false,
        };
        let mut player = Player::new(Vec2::new(100.0, 100.0), 15.0);
        player.advance(&held, 8.0, ARENA);
        assert_eq!(player.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_clamped_to_arena_minus_size() {
        let held = HeldDirections {
            down: true,
            right: true,
            ..Default::default()
        };
        let mut player = Player::new(Vec2::new(480.0, 480.0), 15.0);
        player.advance(&held, 8.0, ARENA);
        assert_eq!(player.pos, Vec2::new(485.0, 485.0));

        let held = HeldDirections {
            up: true,
            left: true,
            ..Default::default()
        };
        let mut player = Player::new(Vec2::new(3.0, 3.0), 15.0);
        player.advance(&held, 8.0, ARENA);
        assert_eq!(player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_bullet_despawns_past_margin() {
        let mut bullets = vec![
            Bullet {
                id: 1,
                pos: Vec2::new(-25.0, 100.0),
                vel: Vec2::new(-6.0, 0.0),
                edge: Edge::Left,
            },
            Bullet {
                id: 2,
                pos: Vec2::new(-15.0, 100.0),
                vel: Vec2::new(3.0, 0.0),
                edge: Edge::Left,
            },
            Bullet {
                id: 3,
                pos: Vec2::new(250.0, 528.0),
                vel: Vec2::new(0.0, 2.0),
                edge: Edge::Top,
            },
        ];
        advance_bullets(&mut bullets, ARENA, 30.0);
        let ids: Vec<u32> = bullets.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(bullets[0].pos, Vec2::new(-12.0, 100.0));

        advance_bullets(&mut bullets, ARENA, 30.0);
        let ids: Vec<u32> = bullets.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2]);
    }

    fn held_strategy() -> impl Strategy<Value = HeldDirections> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(up, down, left, right)| HeldDirections {
                up,
                down,
                left,
                right,
            },
        )
    }

    proptest! {
        #[test]
        fn player_never_leaves_arena(
            start in (0.0f32..485.0, 0.0f32..485.0),
            frames in proptest::collection::vec(held_strategy(), 0..300),
        ) {
            let mut player = Player::new(Vec2::new(start.0, start.1), 15.0);
            for held in &frames {
                player.advance(held, 8.0, ARENA);
                prop_assert!(player.pos.x >= 0.0 && player.pos.x <= ARENA.x - 15.0);
                prop_assert!(player.pos.y >= 0.0 && player.pos.y <= ARENA.y - 15.0);
            }
        }
    }
}
