//! Bullet spawning
//!
//! Bullets appear just outside a random arena edge and head inward. Each
//! edge has its own speed profile: fast from the top, slow from the bottom,
//! more lateral wobble from the sides.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Bullet, Edge};
use crate::tuning::FightTuning;

/// Inbound velocity profile for one edge (pixels per frame)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfile {
    /// Minimum speed toward the arena interior
    pub inbound_min: f32,
    /// Extra inbound speed, scaled by a uniform roll
    pub inbound_jitter: f32,
    /// Full width of the perpendicular drift, centred on zero
    pub lateral_span: f32,
}

impl EdgeProfile {
    pub const fn new(inbound_min: f32, inbound_jitter: f32, lateral_span: f32) -> Self {
        Self {
            inbound_min,
            inbound_jitter,
            lateral_span,
        }
    }
}

impl Edge {
    pub fn profile(&self) -> EdgeProfile {
        match self {
            Edge::Top => EdgeProfile::new(10.0, 3.0, 6.0),
            Edge::Right => EdgeProfile::new(2.0, 2.0, 8.0),
            Edge::Bottom => EdgeProfile::new(1.0, 1.0, 4.0),
            Edge::Left => EdgeProfile::new(2.0, 2.0, 4.0),
        }
    }

    /// Unit vector pointing from this edge into the arena
    pub fn inward(&self) -> Vec2 {
        match self {
            Edge::Top => Vec2::Y,
            Edge::Right => Vec2::NEG_X,
            Edge::Bottom => Vec2::NEG_Y,
            Edge::Left => Vec2::X,
        }
    }
}

/// Create a bullet on a random edge; the caller registers it
pub fn spawn_bullet(rng: &mut Pcg32, id: u32, fight: &FightTuning) -> Bullet {
    let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
    spawn_bullet_on(rng, id, edge, fight)
}

/// Create a bullet on a given edge
pub fn spawn_bullet_on(rng: &mut Pcg32, id: u32, edge: Edge, fight: &FightTuning) -> Bullet {
    let w = fight.arena_width;
    let h = fight.arena_height;
    let off = fight.spawn_offset;

    let along: f32 = rng.random();
    let pos = match edge {
        Edge::Top => Vec2::new(along * w, -off),
        Edge::Right => Vec2::new(w + off, along * h),
        Edge::Bottom => Vec2::new(along * w, h + off),
        Edge::Left => Vec2::new(-off, along * h),
    };

    let profile = edge.profile();
    let inbound = profile.inbound_min + rng.random::<f32>() * profile.inbound_jitter;
    let lateral = (rng.random::<f32>() - 0.5) * profile.lateral_span;
    let inward = edge.inward();
    let across = inward.perp();
    let vel = inward * inbound + across * lateral;

    Bullet { id, pos, vel, edge }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_outside_and_inbound() {
        let fight = FightTuning::default();
        let mut rng = Pcg32::seed_from_u64(7);

        for id in 0..400 {
            let b = spawn_bullet(&mut rng, id, &fight);
            let p = b.edge.profile();
            let inbound = b.vel.dot(b.edge.inward());
            let lateral = b.vel.dot(b.edge.inward().perp());

            assert!(inbound >= p.inbound_min && inbound <= p.inbound_min + p.inbound_jitter);
            assert!(lateral.abs() <= p.lateral_span / 2.0 + 1e-4);

            match b.edge {
                Edge::Top => assert_eq!(b.pos.y, -15.0),
                Edge::Right => assert_eq!(b.pos.x, 515.0),
                Edge::Bottom => assert_eq!(b.pos.y, 515.0),
                Edge::Left => assert_eq!(b.pos.x, -15.0),
            }
            assert!(!b.is_outside(fight.arena_size(), fight.despawn_margin));
        }
    }

    #[test]
    fn test_every_edge_gets_used() {
        let fight = FightTuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut seen = [false; 4];
        for id in 0..200 {
            let b = spawn_bullet(&mut rng, id, &fight);
            let slot = Edge::ALL.iter().position(|e| *e == b.edge).unwrap();
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_top_is_fastest_bottom_slowest() {
        let top = Edge::Top.profile();
        let bottom = Edge::Bottom.profile();
        assert!(top.inbound_min > bottom.inbound_min + bottom.inbound_jitter);
    }

    #[test]
    fn test_same_seed_same_bullets() {
        let fight = FightTuning::default();
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for id in 0..20 {
            let x = spawn_bullet(&mut a, id, &fight);
            let y = spawn_bullet(&mut b, id, &fight);
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
        }
    }
}
