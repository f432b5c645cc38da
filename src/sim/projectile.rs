//! Straight-line projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity};
use crate::consts::{ENEMY_HEADING, PLAYER_FACING};
use crate::outside_play_area;

/// Who fired a projectile (decides what it can hit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

impl Owner {
    fn default_heading(self) -> Vec2 {
        match self {
            Owner::Player => PLAYER_FACING,
            Owner::Enemy => ENEMY_HEADING,
        }
    }
}

/// A shot requested during an update, materialized by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub owner: Owner,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub owner: Owner,
    /// Unit direction of travel
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
}

impl Projectile {
    pub fn new(id: u32, owner: Owner, origin: Vec2, direction: Vec2, speed: f32, radius: f32, damage: f32) -> Self {
        let direction = match direction.try_normalize() {
            Some(dir) => dir,
            None => owner.default_heading(),
        };
        Self {
            body: Body::new(id, origin, radius),
            owner,
            direction,
            speed,
            damage,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Advance and despawn once off the play area
    pub fn update(&mut self, dt: f32) {
        if !self.is_alive() {
            return;
        }
        self.body.pos += self.velocity() * dt;
        if outside_play_area(self.body.pos) {
            self.destroy();
        }
    }
}

impl Entity for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
