//! Enemy behaviors
//!
//! Two variants share one `Enemy` type; the behavior enum carries the
//! variant-specific state:
//! - Ranged orbiter: walks straight at the player and fires on an interval.
//! - Melee striker: approach, dash through the player, retreat, repeat.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{direction_to, within_scaled_reach};
use super::entity::{Body, Entity};
use super::player::Player;
use super::projectile::{Owner, ShotRequest};
use crate::consts::ENEMY_HEADING;
use crate::{count_down, outside_play_area, timer_elapsed};
use crate::tuning::{MeleeTuning, RangedTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    RangedOrbiter,
    MeleeStriker,
}

/// How body contact with the player is resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactPolicy {
    /// Deals this much damage on touch and is consumed
    TouchDamage(f32),
    /// Damage goes through the enemy's own attack; contact only matters when
    /// the player rams it mid-dash
    OwnAttack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangedState {
    pub shoot_timer: f32,
    pub shoot_interval: f32,
    pub bullet_speed: f32,
    pub touch_damage: f32,
}

/// Melee striker attack cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeleePhase {
    Approach,
    Dashing {
        timer: f32,
        direction: Vec2,
        dealt_damage: bool,
    },
    Retreating {
        remaining: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeleeState {
    pub phase: MeleePhase,
    pub dash_cooldown: f32,
    /// Set after the first approach step; no dash before it
    pub has_seen_player: bool,
    pub flash_timer: f32,
    pub tuning: MeleeTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    Ranged(RangedState),
    Melee(MeleeState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub health: f32,
    pub speed: f32,
    /// Mirror hint: -1 when the player is to the right, 1 when to the left
    pub facing: f32,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn ranged(id: u32, pos: Vec2, bullet_speed: f32, tuning: &RangedTuning) -> Self {
        Self {
            body: Body::new(id, pos, tuning.radius),
            health: tuning.health,
            speed: tuning.speed,
            facing: 1.0,
            behavior: Behavior::Ranged(RangedState {
                shoot_timer: 0.0,
                shoot_interval: tuning.shoot_interval,
                bullet_speed,
                touch_damage: tuning.touch_damage,
            }),
        }
    }

    pub fn melee(id: u32, pos: Vec2, speed: f32, tuning: &MeleeTuning) -> Self {
        Self {
            body: Body::new(id, pos, tuning.radius),
            health: tuning.health,
            speed,
            facing: 1.0,
            behavior: Behavior::Melee(MeleeState {
                phase: MeleePhase::Approach,
                dash_cooldown: 0.0,
                has_seen_player: false,
                flash_timer: 0.0,
                tuning: *tuning,
            }),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Ranged(_) => EnemyKind::RangedOrbiter,
            Behavior::Melee(_) => EnemyKind::MeleeStriker,
        }
    }

    pub fn contact_policy(&self) -> ContactPolicy {
        match &self.behavior {
            Behavior::Ranged(r) => ContactPolicy::TouchDamage(r.touch_damage),
            Behavior::Melee(_) => ContactPolicy::OwnAttack,
        }
    }

    pub fn melee_phase(&self) -> Option<MeleePhase> {
        match &self.behavior {
            Behavior::Melee(m) => Some(m.phase),
            Behavior::Ranged(_) => None,
        }
    }

    /// Opacity hint for the renderer
    pub fn opacity(&self) -> f32 {
        match &self.behavior {
            Behavior::Ranged(_) => 1.0,
            Behavior::Melee(m) if m.flash_timer > 0.0 => 0.3,
            Behavior::Melee(m) if m.dash_cooldown > 0.0 => 0.7,
            Behavior::Melee(_) => 1.0,
        }
    }

    /// Apply damage. Returns true if this call destroyed the enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if let Behavior::Melee(m) = &mut self.behavior {
            m.flash_timer = m.tuning.hit_flash;
        }
        self.health <= 0.0 && self.destroy()
    }

    fn face(&mut self, target: Vec2) {
        let dx = target.x - self.body.pos.x;
        if dx > 0.0 {
            self.facing = -1.0;
        } else if dx < 0.0 {
            self.facing = 1.0;
        }
    }

    /// Advance one tick. Returns damage dealt to the player by a melee dash.
    pub fn update(&mut self, dt: f32, player: &mut Player, shots: &mut Vec<ShotRequest>) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }

        let player_alive = player.is_alive();
        if player_alive {
            self.face(player.pos());
        }

        let dealt = match self.kind() {
            EnemyKind::RangedOrbiter => {
                self.update_ranged(dt, player_alive.then(|| player.pos()), shots);
                0.0
            }
            EnemyKind::MeleeStriker => self.update_melee(dt, player),
        };

        if outside_play_area(self.body.pos) {
            log::debug!("Enemy {} left the play area", self.body.id);
            self.destroy();
        }
        dealt
    }

    fn update_ranged(&mut self, dt: f32, target: Option<Vec2>, shots: &mut Vec<ShotRequest>) {
        let heading = match target {
            Some(t) => direction_to(self.body.pos, t),
            None => ENEMY_HEADING,
        };
        self.body.pos += heading * self.speed * dt;

        let Behavior::Ranged(state) = &mut self.behavior else {
            return;
        };
        state.shoot_timer += dt;
        match target {
            Some(t) if timer_elapsed(state.shoot_timer, state.shoot_interval) => {
                shots.push(ShotRequest {
                    owner: Owner::Enemy,
                    origin: self.body.pos,
                    direction: direction_to(self.body.pos, t),
                    speed: state.bullet_speed,
                });
                state.shoot_timer = 0.0;
            }
            _ => {}
        }
    }

    fn update_melee(&mut self, dt: f32, player: &mut Player) -> f32 {
        let pos = self.body.pos;
        let speed = self.speed;
        let radius = self.body.radius;
        let Behavior::Melee(state) = &mut self.behavior else {
            return 0.0;
        };
        let t = state.tuning;

        state.dash_cooldown = count_down(state.dash_cooldown, dt);
        state.flash_timer = count_down(state.flash_timer, dt);
        if let MeleePhase::Retreating { remaining } = &mut state.phase {
            *remaining = count_down(*remaining, dt);
            if *remaining <= 0.0 {
                state.phase = MeleePhase::Approach;
            }
        }

        if !player.is_alive() {
            return 0.0;
        }
        let target = player.pos();
        let distance = pos.distance(target);
        let mut dealt = 0.0;

        let new_pos = match &mut state.phase {
            MeleePhase::Dashing {
                timer,
                direction,
                dealt_damage,
            } => {
                *timer += dt;
                if !timer_elapsed(*timer, t.dash_duration) {
                    let next = pos + *direction * speed * t.dash_speed_factor * dt;
                    if !*dealt_damage
                        && *timer > t.dash_duration * t.hit_window_start
                        && within_scaled_reach(next, radius, target, player.radius(), t.hit_radius_factor)
                    {
                        dealt = player.take_damage(t.dash_damage);
                        *dealt_damage = true;
                        log::debug!("Melee dash hit for {}", dealt);
                    }
                    next
                } else {
                    state.dash_cooldown = t.dash_cooldown;
                    state.phase = MeleePhase::Retreating {
                        remaining: t.retreat_duration,
                    };
                    pos
                }
            }
            MeleePhase::Retreating { .. } => {
                pos + direction_to(target, pos) * speed * t.retreat_speed_factor * dt
            }
            MeleePhase::Approach => {
                let latched = state.has_seen_player;
                let next = pos + direction_to(pos, target) * speed * dt;
                state.has_seen_player = true;

                let in_range = distance <= t.melee_range;
                let too_close = distance < t.min_dash_distance;
                if latched && in_range && !too_close && state.dash_cooldown <= 0.0 {
                    state.phase = MeleePhase::Dashing {
                        timer: 0.0,
                        direction: direction_to(next, target),
                        dealt_damage: false,
                    };
                    log::debug!("Melee dash from distance {:.2}", distance);
                }
                next
            }
        };

        self.body.pos = new_pos;
        dealt
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::tuning::{PlayerTuning, Tuning};
    use proptest::prelude::*;

    fn player_at(pos: Vec2) -> Player {
        let mut p = Player::new(1, PlayerTuning::default(), 10.0);
        p.body.pos = pos;
        p
    }

    fn melee_at(pos: Vec2) -> Enemy {
        Enemy::melee(2, pos, 1.5, &Tuning::default().melee)
    }

    #[test]
    fn test_ranged_fires_once_after_interval() {
        let tuning = Tuning::default();
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = Enemy::ranged(2, Vec2::new(5.0, 0.0), 6.0, &tuning.ranged);
        let mut shots = Vec::new();

        for _ in 0..7 {
            enemy.update(0.25, &mut player, &mut shots);
        }
        assert!(shots.is_empty());
        enemy.update(0.25, &mut player, &mut shots);
        assert_eq!(shots.len(), 1);

        let shot = shots[0];
        assert_eq!(shot.owner, Owner::Enemy);
        assert_eq!(shot.speed, 6.0);
        assert!((shot.direction - Vec2::NEG_X).length() < 1e-6);
        // Walked 4 units toward the player
        assert!((enemy.body.pos.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ranged_fires_after_two_seconds_of_sim_ticks() {
        let tuning = Tuning::default();
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = Enemy::ranged(2, Vec2::new(0.0, 14.0), 6.0, &tuning.ranged);
        let mut shots = Vec::new();
        for _ in 0..239 {
            enemy.update(SIM_DT, &mut player, &mut shots);
        }
        assert!(shots.is_empty());
        enemy.update(SIM_DT, &mut player, &mut shots);
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn test_melee_cooldown_and_retreat_end_on_time() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(10.0, 0.0));
        if let Behavior::Melee(state) = &mut enemy.behavior {
            state.phase = MeleePhase::Retreating { remaining: 1.0 };
            state.dash_cooldown = 1.0;
        }
        for _ in 0..119 {
            enemy.update(SIM_DT, &mut player, &mut Vec::new());
        }
        assert!(matches!(enemy.melee_phase(), Some(MeleePhase::Retreating { .. })));
        enemy.update(SIM_DT, &mut player, &mut Vec::new());
        assert_eq!(enemy.melee_phase(), Some(MeleePhase::Approach));
        assert_eq!(enemy.opacity(), 1.0);
    }

    #[test]
    fn test_ranged_holds_fire_without_player() {
        let tuning = Tuning::default();
        let mut player = player_at(Vec2::ZERO);
        player.destroy();
        let mut enemy = Enemy::ranged(2, Vec2::new(0.0, 5.0), 6.0, &tuning.ranged);
        let mut shots = Vec::new();
        for _ in 0..12 {
            enemy.update(0.25, &mut player, &mut shots);
        }
        assert!(shots.is_empty());
        // Drifts downward
        assert!((enemy.body.pos.y - -1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ranged_dies_in_one_hit() {
        let tuning = Tuning::default();
        let mut enemy = Enemy::ranged(2, Vec2::ZERO, 6.0, &tuning.ranged);
        assert!(enemy.take_damage(1.0));
        assert!(!enemy.is_alive());
        assert!(!enemy.take_damage(1.0));
    }

    #[test]
    fn test_facing_mirrors_toward_player() {
        let tuning = Tuning::default();
        let mut shots = Vec::new();
        let mut enemy = Enemy::ranged(2, Vec2::new(-5.0, 0.0), 6.0, &tuning.ranged);
        let mut player = player_at(Vec2::ZERO);
        enemy.update(0.01, &mut player, &mut shots);
        assert_eq!(enemy.facing, -1.0);
        player.body.pos = Vec2::new(-10.0, 0.0);
        enemy.update(0.01, &mut player, &mut shots);
        assert_eq!(enemy.facing, 1.0);
    }

    #[test]
    fn test_enemy_leaving_play_area_is_destroyed() {
        let tuning = Tuning::default();
        let mut player = player_at(Vec2::ZERO);
        player.destroy();
        let mut enemy = Enemy::ranged(2, Vec2::new(0.0, -14.9), 6.0, &tuning.ranged);
        enemy.update(0.25, &mut player, &mut Vec::new());
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_contact_policy_by_variant() {
        let tuning = Tuning::default();
        let ranged = Enemy::ranged(2, Vec2::ZERO, 6.0, &tuning.ranged);
        assert_eq!(ranged.contact_policy(), ContactPolicy::TouchDamage(1.0));
        assert_eq!(melee_at(Vec2::ZERO).contact_policy(), ContactPolicy::OwnAttack);
        assert_eq!(melee_at(Vec2::ZERO).kind(), EnemyKind::MeleeStriker);
    }

    #[test]
    fn test_melee_needs_latch_before_dashing() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(3.0, 0.0));
        enemy.update(0.01, &mut player, &mut Vec::new());
        assert_eq!(enemy.melee_phase(), Some(MeleePhase::Approach));
        enemy.update(0.01, &mut player, &mut Vec::new());
        assert!(matches!(enemy.melee_phase(), Some(MeleePhase::Dashing { .. })));
    }

    #[test]
    fn test_melee_never_dashes_too_close() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(2.7, 0.0));
        for _ in 0..10 {
            enemy.update(0.01, &mut player, &mut Vec::new());
            assert_eq!(enemy.melee_phase(), Some(MeleePhase::Approach));
        }
    }

    #[test]
    fn test_melee_out_of_range_keeps_approaching() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(10.0, 0.0));
        enemy.update(0.5, &mut player, &mut Vec::new());
        enemy.update(0.5, &mut player, &mut Vec::new());
        assert_eq!(enemy.melee_phase(), Some(MeleePhase::Approach));
        assert!((enemy.body.pos.x - 8.5).abs() < 1e-5);
    }

    #[test]
    fn test_melee_cycle_hits_once_then_retreats() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(3.0, 0.0));
        let mut total = 0.0;
        let mut saw_retreat = false;

        for _ in 0..100 {
            total += enemy.update(0.01, &mut player, &mut Vec::new());
            if matches!(enemy.melee_phase(), Some(MeleePhase::Retreating { .. })) {
                saw_retreat = true;
                break;
            }
        }
        assert!(saw_retreat);
        assert_eq!(total, 25.0);
        assert_eq!(player.health, 75.0);

        let Behavior::Melee(state) = &enemy.behavior else {
            panic!("expected melee");
        };
        assert!((state.dash_cooldown - 2.0).abs() < 1e-6);
        assert_eq!(enemy.opacity(), 0.7);
    }

    #[test]
    fn test_melee_dash_respects_player_invulnerability() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(3.0, 0.0));
        // Player is never updated here, so the dash lasts the whole test
        player.start_dash(Vec2::Y);
        let mut total = 0.0;
        for _ in 0..40 {
            total += enemy.update(0.01, &mut player, &mut Vec::new());
        }
        assert_eq!(total, 0.0);
        assert_eq!(player.health, 100.0);
    }

    #[test]
    fn test_melee_retreat_returns_to_approach() {
        let mut player = player_at(Vec2::ZERO);
        let mut enemy = melee_at(Vec2::new(5.0, 0.0));
        if let Behavior::Melee(state) = &mut enemy.behavior {
            state.phase = MeleePhase::Retreating { remaining: 1.0 };
            state.has_seen_player = true;
        }
        enemy.update(0.5, &mut player, &mut Vec::new());
        // Moved away at 0.7x speed
        assert!((enemy.body.pos.x - (5.0 + 1.5 * 0.7 * 0.5)).abs() < 1e-5);
        enemy.update(0.5, &mut player, &mut Vec::new());
        assert_eq!(enemy.melee_phase(), Some(MeleePhase::Approach));
    }

    #[test]
    fn test_melee_two_hits_and_flash() {
        let mut enemy = melee_at(Vec2::ZERO);
        assert!(!enemy.take_damage(1.0));
        assert_eq!(enemy.opacity(), 0.3);
        assert!(enemy.take_damage(1.0));
        assert!(!enemy.take_damage(1.0));
    }

    proptest! {
        #[test]
        fn prop_enemy_health_never_increases(hits in proptest::collection::vec(-5.0f32..5.0, 1..20), melee in any::<bool>()) {
            let tuning = Tuning::default();
            let mut enemy = if melee {
                melee_at(Vec2::ZERO)
            } else {
                Enemy::ranged(2, Vec2::ZERO, 6.0, &tuning.ranged)
            };
            let mut destroyed = 0;
            let mut last = enemy.health;
            for hit in hits {
                if enemy.take_damage(hit) {
                    destroyed += 1;
                }
                prop_assert!(enemy.health <= last);
                last = enemy.health;
            }
            prop_assert!(destroyed <= 1);
            prop_assert_eq!(destroyed == 1, !enemy.is_alive());
        }
    }
}
