//! Shared actor state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;

/// Position, size and liveness shared by every actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    destroyed: bool,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            destroyed: false,
        }
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mark destroyed. Returns false if it already was.
    pub fn destroy(&mut self) -> bool {
        !std::mem::replace(&mut self.destroyed, true)
    }
}

/// Anything with a body
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn id(&self) -> u32 {
        self.body().id
    }

    fn pos(&self) -> Vec2 {
        self.body().pos
    }

    fn radius(&self) -> f32 {
        self.body().radius
    }

    fn is_alive(&self) -> bool {
        !self.body().is_destroyed()
    }

    fn destroy(&mut self) -> bool {
        self.body_mut().destroy()
    }

    /// Strict circle overlap; destroyed entities never collide
    fn collides_with(&self, other: &dyn Entity) -> bool {
        self.is_alive()
            && other.is_alive()
            && circles_overlap(self.pos(), self.radius(), other.pos(), other.radius())
    }
}
