//! Reef Arena - a 2D arena shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, enemies, waves, collisions)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the shell feeds into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Field the player is clamped to
    pub const FIELD_HALF_WIDTH: f32 = 15.0;
    pub const FIELD_HALF_HEIGHT: f32 = 8.0;

    /// Play area; projectiles and enemies outside it are despawned
    pub const PLAY_HALF_WIDTH: f32 = 20.0;
    pub const PLAY_HALF_HEIGHT: f32 = 15.0;

    /// Default facing (up)
    pub const PLAYER_FACING: glam::Vec2 = glam::Vec2::new(0.0, 1.0);
    /// Fallback heading for enemies and their shots (down)
    pub const ENEMY_HEADING: glam::Vec2 = glam::Vec2::new(0.0, -1.0);

    /// Tolerance for timers that sum f32 ticks (240 ticks of SIM_DT land
    /// a few ulps short of 2.0)
    pub const TIMER_SLACK: f32 = 1e-4;
}

/// True once an accumulating timer has reached `duration`
#[inline]
pub fn timer_elapsed(timer: f32, duration: f32) -> bool {
    timer + consts::TIMER_SLACK >= duration
}

/// Decrement a countdown, snapping to zero once it is within slack
#[inline]
pub fn count_down(remaining: f32, dt: f32) -> f32 {
    let left = remaining - dt;
    if left <= consts::TIMER_SLACK { 0.0 } else { left }
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate_by(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Clamp a position into the player field
#[inline]
pub fn clamp_to_field(pos: Vec2) -> Vec2 {
    use consts::*;
    Vec2::new(
        pos.x.clamp(-FIELD_HALF_WIDTH, FIELD_HALF_WIDTH),
        pos.y.clamp(-FIELD_HALF_HEIGHT, FIELD_HALF_HEIGHT),
    )
}

/// True if a position has left the play area
#[inline]
pub fn outside_play_area(pos: Vec2) -> bool {
    use consts::*;
    pos.x.abs() > PLAY_HALF_WIDTH || pos.y.abs() > PLAY_HALF_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_by(Vec2::X, FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_to_field() {
        let p = clamp_to_field(Vec2::new(30.0, -12.0));
        assert_eq!(p, Vec2::new(15.0, -8.0));
        let inside = Vec2::new(3.0, 2.0);
        assert_eq!(clamp_to_field(inside), inside);
    }

    #[test]
    fn test_timers_reach_two_seconds_in_240_ticks() {
        let mut timer = 0.0f32;
        let mut countdown = 2.0f32;
        for _ in 0..239 {
            timer += consts::SIM_DT;
            countdown = count_down(countdown, consts::SIM_DT);
        }
        assert!(!timer_elapsed(timer, 2.0));
        assert!(countdown > 0.0);

        timer += consts::SIM_DT;
        countdown = count_down(countdown, consts::SIM_DT);
        assert!(timer_elapsed(timer, 2.0));
        assert_eq!(countdown, 0.0);
    }

    #[test]
    fn test_outside_play_area() {
        assert!(!outside_play_area(Vec2::new(20.0, 15.0)));
        assert!(outside_play_area(Vec2::new(20.1, 0.0)));
        assert!(outside_play_area(Vec2::new(0.0, -15.5)));
    }
}
