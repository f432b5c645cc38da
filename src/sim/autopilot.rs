//! Idle/demo mode - the AI plays the game
//!
//! Produces the same input events a human would, so demo runs go through
//! the exact gesture and cooldown rules.

use glam::Vec2;

use super::collision::direction_to;
use super::entity::Entity;
use super::player::{InputEvent, MoveKey};
use super::state::GameState;

/// Back off when an enemy is closer than this
const KEEP_AWAY: f32 = 5.0;
/// Close in when the nearest enemy is farther than this
const ENGAGE: f32 = 9.0;
/// Dash away from enemy shots inside this radius
const DODGE_RADIUS: f32 = 2.5;
/// Ticks between strafe direction flips (2 seconds at 120 Hz)
const STRAFE_TICKS: u64 = 240;
/// Fire a burst instead of a single when this many enemies are alive
const BURST_CROWD: usize = 3;

/// Direction the AI wants to move in
fn desired_direction(state: &GameState) -> Vec2 {
    let pos = state.player.pos();
    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| pos.distance(a.pos()).total_cmp(&pos.distance(b.pos())));

    let Some(enemy) = nearest else {
        // Drift back to the middle between waves
        return if pos.length() > 1.0 { -pos.normalize_or_zero() } else { Vec2::ZERO };
    };

    let distance = pos.distance(enemy.pos());
    let away = direction_to(enemy.pos(), pos);
    if distance < KEEP_AWAY {
        away
    } else if distance > ENGAGE {
        -away
    } else {
        // Circle the target, flipping now and then to avoid loops
        let sign = if (state.time_ticks / STRAFE_TICKS).is_multiple_of(2) { 1.0 } else { -1.0 };
        away.perp() * sign
    }
}

fn threatened(state: &GameState) -> bool {
    let pos = state.player.pos();
    state.enemy_shots.iter().filter(|s| s.is_alive()).any(|s| {
        let closing = s.direction.dot(direction_to(s.pos(), pos)) > 0.0;
        closing && s.pos().distance(pos) < DODGE_RADIUS
    })
}

/// Input events for this tick
pub fn autopilot_events(state: &GameState) -> Vec<InputEvent> {
    let player = &state.player;
    let mut events = Vec::new();
    if !player.is_alive() {
        return events;
    }

    let want = desired_direction(state);
    let wanted = |key: MoveKey| match key {
        MoveKey::W => want.y > 0.3,
        MoveKey::S => want.y < -0.3,
        MoveKey::A => want.x < -0.3,
        MoveKey::D => want.x > 0.3,
        // Arrows are left to a human
        _ => false,
    };
    for key in MoveKey::ALL {
        match (wanted(key), player.is_held(key)) {
            (true, false) => events.push(InputEvent::KeyDown(key)),
            (false, true) => events.push(InputEvent::KeyUp(key)),
            _ => {}
        }
    }

    if threatened(state) && player.dash_cooldown <= 0.0 && !player.is_dashing() && want != Vec2::ZERO {
        events.push(InputEvent::DashDown);
    }

    let alive = state.alive_enemies();
    if alive > 0 && player.shoot_cooldown <= 0.0 && !player.has_pending_shot() {
        let presses = if alive >= BURST_CROWD { 2 } else { 1 };
        for _ in 0..presses {
            events.push(InputEvent::ShootDown);
            events.push(InputEvent::ShootUp);
        }
    }

    events
}
