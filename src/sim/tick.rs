//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::autopilot::autopilot_events;
use super::enemy::ContactPolicy;
use super::entity::Entity;
use super::player::{InputEvent, PlayerActions};
use super::projectile::ShotRequest;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Input events in arrival order
    pub events: Vec<InputEvent>,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Only keep held-key state in sync while stopped
    if state.phase != GamePhase::Running {
        for event in &input.events {
            state.player.track_held(*event);
        }
        return;
    }

    state.time_ticks += 1;

    let mut events = input.events.clone();
    if input.idle_mode {
        events.extend(autopilot_events(state));
    }

    // Shots requested this tick, materialized after the actors update
    let mut shots: Vec<ShotRequest> = Vec::new();

    for event in events {
        let actions = state
            .player
            .handle_input(event, state.clock, &state.enemies, &mut shots);
        record_actions(state, actions);
    }

    state.clock += f64::from(dt);

    let actions = state
        .player
        .update(dt, state.clock, &state.enemies, &mut shots);
    record_actions(state, actions);

    for enemy in &mut state.enemies {
        let dealt = enemy.update(dt, &mut state.player, &mut shots);
        if dealt > 0.0 {
            state.events.push(GameEvent::PlayerDamaged {
                amount: dealt,
                health: state.player.health,
            });
        }
    }

    for request in shots {
        state.spawn_projectile(request);
    }

    for shot in &mut state.player_shots {
        shot.update(dt);
    }
    for shot in &mut state.enemy_shots {
        shot.update(dt);
    }

    let alive = state.alive_enemies();
    let mut wave_events = Vec::new();
    state
        .director
        .update(dt, alive, &mut state.rng, &mut wave_events);
    for event in wave_events {
        state.apply_wave_event(event);
    }

    resolve_collisions(state);

    if state.player.health <= 0.0 && state.phase == GamePhase::Running {
        state.phase = GamePhase::GameOver;
        state.player.destroy();
        log::info!(
            "Game over on level {} after {:.1}s",
            state.director.current_level,
            state.clock
        );
        state.events.push(GameEvent::Despawned {
            id: state.player.id(),
        });
        state.events.push(GameEvent::GameOver);
    }

    state.prune();
    state.publish_hud();
}

fn record_actions(state: &mut GameState, actions: PlayerActions) {
    if actions.dash_started {
        state.events.push(GameEvent::DashStarted);
    }
    if actions.bullets_fired > 0 {
        log::debug!("Player fired {}", actions.bullets_fired);
        state.events.push(GameEvent::Shot {
            count: actions.bullets_fired,
        });
    }
}

/// Projectile hits and body contact
fn resolve_collisions(state: &mut GameState) {
    // Player shots damage every enemy they overlap, then expire
    for shot in state.player_shots.iter_mut().filter(|s| s.is_alive()) {
        let mut hit = false;
        for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
            if shot.collides_with(&*enemy) {
                hit = true;
                if enemy.take_damage(shot.damage) {
                    log::debug!("Enemy {} destroyed", enemy.id());
                }
            }
        }
        if hit {
            shot.destroy();
        }
    }

    if !state.player.is_alive() {
        return;
    }

    // Enemy shots vs player
    for shot in state.enemy_shots.iter_mut().filter(|s| s.is_alive()) {
        if shot.collides_with(&state.player) {
            shot.destroy();
            let dealt = state.player.take_damage(shot.damage);
            if dealt > 0.0 {
                state.events.push(GameEvent::PlayerDamaged {
                    amount: dealt,
                    health: state.player.health,
                });
            }
        }
    }

    // Body contact
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if !enemy.collides_with(&state.player) {
            continue;
        }
        match enemy.contact_policy() {
            ContactPolicy::TouchDamage(damage) => {
                enemy.destroy();
                let dealt = state.player.take_damage(damage);
                if dealt > 0.0 {
                    state.events.push(GameEvent::PlayerDamaged {
                        amount: dealt,
                        health: state.player.health,
                    });
                }
            }
            ContactPolicy::OwnAttack => {
                if state.player.is_dashing() {
                    log::debug!("Player rammed enemy {}", enemy.id());
                    enemy.destroy();
                }
            }
        }
    }
}
