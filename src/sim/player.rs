//! Player controller
//!
//! Movement, the dash state machine, double-tap / double-click gestures,
//! target selection and the shoot cooldown.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::direction_to;
use super::enemy::Enemy;
use super::entity::{Body, Entity};
use super::gesture::{ClickBurst, DoubleTap, Volley};
use super::projectile::{Owner, ShotRequest};
use crate::consts::PLAYER_FACING;
use crate::tuning::PlayerTuning;
use crate::{clamp_to_field, count_down, rotate_by, timer_elapsed};

/// Movement keys (two per direction, each with its own double-tap tracker)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKey {
    W,
    A,
    S,
    D,
    Up,
    Left,
    Down,
    Right,
}

impl MoveKey {
    pub const ALL: [MoveKey; 8] = [
        MoveKey::W,
        MoveKey::A,
        MoveKey::S,
        MoveKey::D,
        MoveKey::Up,
        MoveKey::Left,
        MoveKey::Down,
        MoveKey::Right,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Unit direction this key moves in
    pub fn direction(self) -> Vec2 {
        match self {
            MoveKey::W | MoveKey::Up => Vec2::Y,
            MoveKey::S | MoveKey::Down => Vec2::NEG_Y,
            MoveKey::A | MoveKey::Left => Vec2::NEG_X,
            MoveKey::D | MoveKey::Right => Vec2::X,
        }
    }
}

/// Abstract input events, stamped with the tick clock when applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(MoveKey),
    KeyUp(MoveKey),
    DashDown,
    ShootDown,
    ShootUp,
}

/// Dash state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DashPhase {
    Idle,
    Dashing { timer: f32, direction: Vec2 },
}

/// What the player did during an input or update step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerActions {
    pub dash_started: bool,
    pub bullets_fired: u32,
}

impl PlayerActions {
    fn merge(&mut self, other: PlayerActions) {
        self.dash_started |= other.dash_started;
        self.bullets_fired += other.bullets_fired;
    }
}

/// The player-controlled entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: f32,
    pub tuning: PlayerTuning,
    /// Speed of bullets the player fires
    pub shot_speed: f32,
    pub shoot_cooldown: f32,
    pub dash: DashPhase,
    pub dash_cooldown: f32,
    /// Facing used for targeting when nothing better is known
    pub last_direction: Vec2,
    /// Horizontal mirror hint (-1 facing left, 1 facing right)
    pub facing: f32,
    /// Tilt hint (radians)
    pub tilt: f32,
    held: [bool; 8],
    shoot_held: bool,
    taps: [DoubleTap; 8],
    click: ClickBurst,
}

impl Player {
    pub fn new(id: u32, tuning: PlayerTuning, shot_speed: f32) -> Self {
        Self {
            body: Body::new(id, Vec2::ZERO, tuning.radius),
            health: tuning.max_health,
            tuning,
            shot_speed,
            shoot_cooldown: 0.0,
            dash: DashPhase::Idle,
            dash_cooldown: 0.0,
            last_direction: PLAYER_FACING,
            facing: 1.0,
            tilt: 0.0,
            held: [false; 8],
            shoot_held: false,
            taps: Default::default(),
            click: ClickBurst::default(),
        }
    }

    /// Restore start-of-run state, keeping the id
    pub fn reset(&mut self) {
        *self = Self::new(self.body.id, self.tuning, self.shot_speed);
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        matches!(self.dash, DashPhase::Dashing { .. })
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held[key.index()]
    }

    pub fn is_shoot_held(&self) -> bool {
        self.shoot_held
    }

    /// True while a lone shoot press is waiting for its window to close
    pub fn has_pending_shot(&self) -> bool {
        self.click.is_armed()
    }

    /// Opacity hint for the renderer
    pub fn opacity(&self) -> f32 {
        if self.is_dashing() { 0.7 } else { 1.0 }
    }

    /// Summed (not normalized) direction of all held keys
    pub fn held_direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        let axis = |a: MoveKey, b: MoveKey| self.is_held(a) || self.is_held(b);
        if axis(MoveKey::W, MoveKey::Up) {
            dir.y += 1.0;
        }
        if axis(MoveKey::S, MoveKey::Down) {
            dir.y -= 1.0;
        }
        if axis(MoveKey::A, MoveKey::Left) {
            dir.x -= 1.0;
        }
        if axis(MoveKey::D, MoveKey::Right) {
            dir.x += 1.0;
        }
        dir
    }

    /// Track held keys only (used while the game is paused)
    pub fn track_held(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.held[key.index()] = true,
            InputEvent::KeyUp(key) => self.held[key.index()] = false,
            InputEvent::ShootDown => self.shoot_held = true,
            InputEvent::ShootUp => self.shoot_held = false,
            InputEvent::DashDown => {}
        }
    }

    /// Apply one input event at clock time `now`
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        now: f64,
        enemies: &[Enemy],
        shots: &mut Vec<ShotRequest>,
    ) -> PlayerActions {
        let mut actions = PlayerActions::default();
        self.track_held(event);

        match event {
            InputEvent::KeyDown(key) => {
                let ready = self.dash_cooldown <= 0.0;
                if self.taps[key.index()].press(now, self.tuning.double_tap_window, ready) {
                    actions.dash_started = self.start_dash(key.direction());
                }
            }
            InputEvent::DashDown => {
                let ready = self.dash_cooldown <= 0.0;
                if let Some(dir) = self.held_direction().try_normalize().filter(|_| ready) {
                    actions.dash_started = self.start_dash(dir);
                }
            }
            InputEvent::ShootDown => {
                // Presses during cooldown do not count toward the gesture
                if self.shoot_cooldown <= 0.0
                    && self.click.press(now, self.tuning.double_click_window) == Some(Volley::Burst)
                {
                    log::debug!("Burst shot");
                    actions.bullets_fired = self.shoot(self.tuning.burst_count, enemies, shots);
                }
            }
            InputEvent::KeyUp(_) | InputEvent::ShootUp => {}
        }

        actions
    }

    /// Begin a dash along `direction` (ignored if already dashing)
    pub fn start_dash(&mut self, direction: Vec2) -> bool {
        if self.is_dashing() {
            return false;
        }
        self.dash = DashPhase::Dashing {
            timer: 0.0,
            direction: direction.normalize_or_zero(),
        };
        self.dash_cooldown = self.tuning.dash_cooldown;
        log::debug!("Player dash toward ({:.2}, {:.2})", direction.x, direction.y);
        true
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        dt: f32,
        now: f64,
        enemies: &[Enemy],
        shots: &mut Vec<ShotRequest>,
    ) -> PlayerActions {
        let mut actions = PlayerActions::default();
        if !self.is_alive() {
            return actions;
        }

        for tap in &mut self.taps {
            tap.expire(now);
        }

        let dashed = self.advance_dash(dt);
        if !dashed {
            self.advance_movement(dt);
        }

        self.shoot_cooldown = count_down(self.shoot_cooldown, dt);
        self.dash_cooldown = count_down(self.dash_cooldown, dt);

        if self.click.poll(now, self.shoot_cooldown <= 0.0) == Some(Volley::Single) {
            actions.merge(PlayerActions {
                dash_started: false,
                bullets_fired: self.shoot(1, enemies, shots),
            });
        }

        actions
    }

    /// Returns true if the player was dashing at the start of the tick
    fn advance_dash(&mut self, dt: f32) -> bool {
        let DashPhase::Dashing { timer, direction } = self.dash else {
            return false;
        };

        let duration = self.tuning.dash_duration;
        let speed = self.tuning.dash_distance / duration;
        let elapsed = timer + dt;
        // Last step is truncated so the full dash covers exactly dash_distance
        let step = dt.min(duration - timer).max(0.0);

        self.body.pos = clamp_to_field(self.body.pos + direction * speed * step);
        self.orient(direction);

        self.dash = if timer_elapsed(elapsed, duration) {
            DashPhase::Idle
        } else {
            DashPhase::Dashing {
                timer: elapsed,
                direction,
            }
        };
        true
    }

    fn advance_movement(&mut self, dt: f32) {
        let dir = self.held_direction();
        self.body.pos = clamp_to_field(self.body.pos + dir * self.tuning.speed * dt);
        self.orient(dir);
        if let Some(unit) = dir.try_normalize() {
            self.last_direction = unit;
        }
    }

    fn orient(&mut self, dir: Vec2) {
        if dir.x < 0.0 {
            self.facing = -1.0;
        } else if dir.x > 0.0 {
            self.facing = 1.0;
        }
        self.tilt = if dir.y > 0.0 {
            -0.2
        } else if dir.y < 0.0 {
            0.2
        } else {
            0.0
        };
    }

    /// Position of the preferred target: nearest live enemy, biased toward
    /// the current facing
    pub fn find_target(&self, enemies: &[Enemy]) -> Option<Vec2> {
        let pos = self.body.pos;
        enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| {
                let alignment = self.last_direction.dot(direction_to(pos, e.pos()));
                (pos.distance(e.pos()) - self.tuning.aim_bias * alignment, e.pos())
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, target)| target)
    }

    /// Fire `count` bullets if the cooldown allows. Returns bullets fired.
    pub fn shoot(&mut self, count: u32, enemies: &[Enemy], shots: &mut Vec<ShotRequest>) -> u32 {
        if self.shoot_cooldown > 0.0 || count == 0 {
            return 0;
        }

        let base = self
            .find_target(enemies)
            .and_then(|target| (target - self.body.pos).try_normalize())
            .unwrap_or(self.last_direction);

        let spread = self.tuning.burst_spread;
        let center = (count - 1) as f32 / 2.0;
        for i in 0..count {
            let lane = i as f32 - center;
            let (direction, offset) = if count > 1 {
                let angle = lane * spread / (count - 1) as f32;
                (rotate_by(base, angle).normalize(), lane * self.tuning.burst_offset)
            } else {
                (base, 0.0)
            };
            shots.push(ShotRequest {
                owner: Owner::Player,
                origin: self.body.pos + Vec2::new(offset, 0.0),
                direction,
                speed: self.shot_speed,
            });
        }

        self.shoot_cooldown = self.tuning.shoot_cooldown;
        count
    }

    /// Apply damage unless dashing. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.is_dashing() {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        before - self.health
    }
}

impl Entity for Player {
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
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(1, PlayerTuning::default(), 10.0)
    }

    fn press(p: &mut Player, event: InputEvent, now: f64, shots: &mut Vec<ShotRequest>) -> PlayerActions {
        p.handle_input(event, now, &[], shots)
    }

    #[test]
    fn test_axis_speeds_stack_on_diagonal() {
        let mut p = player();
        let mut shots = Vec::new();
        press(&mut p, InputEvent::KeyDown(MoveKey::D), 0.0, &mut shots);
        press(&mut p, InputEvent::KeyDown(MoveKey::W), 0.0, &mut shots);
        p.update(0.5, 0.5, &[], &mut shots);
        assert!((p.body.pos - Vec2::new(3.0, 3.0)).length() < 1e-5);
        let diag = std::f32::consts::FRAC_1_SQRT_2;
        assert!((p.last_direction - Vec2::new(diag, diag)).length() < 1e-5);
    }

    #[test]
    fn test_movement_clamped_to_field() {
        let mut p = player();
        let mut shots = Vec::new();
        press(&mut p, InputEvent::KeyDown(MoveKey::Left), 0.0, &mut shots);
        p.update(10.0, 10.0, &[], &mut shots);
        assert_eq!(p.body.pos, Vec2::new(-15.0, 0.0));
        assert_eq!(p.facing, -1.0);
    }

    #[test]
    fn test_arrow_and_wasd_share_direction() {
        let mut p = player();
        p.track_held(InputEvent::KeyDown(MoveKey::W));
        p.track_held(InputEvent::KeyDown(MoveKey::Up));
        assert_eq!(p.held_direction(), Vec2::Y);
        p.track_held(InputEvent::KeyUp(MoveKey::W));
        assert_eq!(p.held_direction(), Vec2::Y);
        p.track_held(InputEvent::KeyUp(MoveKey::Up));
        assert_eq!(p.held_direction(), Vec2::ZERO);
    }

    #[test]
    fn test_double_tap_starts_one_dash() {
        let mut p = player();
        let mut shots = Vec::new();
        let a = press(&mut p, InputEvent::KeyDown(MoveKey::D), 0.0, &mut shots);
        press(&mut p, InputEvent::KeyUp(MoveKey::D), 0.05, &mut shots);
        let b = press(&mut p, InputEvent::KeyDown(MoveKey::D), 0.2, &mut shots);
        assert!(!a.dash_started);
        assert!(b.dash_started);
        assert!(p.is_dashing());

        // Third press in the same window while on cooldown
        press(&mut p, InputEvent::KeyUp(MoveKey::D), 0.25, &mut shots);
        let c = press(&mut p, InputEvent::KeyDown(MoveKey::D), 0.3, &mut shots);
        assert!(!c.dash_started);
        assert!((p.dash_cooldown - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_slow_double_tap_does_not_dash() {
        let mut p = player();
        let mut shots = Vec::new();
        press(&mut p, InputEvent::KeyDown(MoveKey::A), 0.0, &mut shots);
        let late = press(&mut p, InputEvent::KeyDown(MoveKey::A), 0.6, &mut shots);
        assert!(!late.dash_started);
        let quick = press(&mut p, InputEvent::KeyDown(MoveKey::A), 0.9, &mut shots);
        assert!(quick.dash_started);
    }

    #[test]
    fn test_dash_key_needs_held_direction() {
        let mut p = player();
        let mut shots = Vec::new();
        assert!(!press(&mut p, InputEvent::DashDown, 0.0, &mut shots).dash_started);
        press(&mut p, InputEvent::KeyDown(MoveKey::Right), 0.0, &mut shots);
        press(&mut p, InputEvent::KeyDown(MoveKey::Up), 0.0, &mut shots);
        assert!(press(&mut p, InputEvent::DashDown, 0.0, &mut shots).dash_started);
        let DashPhase::Dashing { direction, .. } = p.dash else {
            panic!("expected dash");
        };
        assert!((direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dash_covers_distance_and_terminates() {
        let mut p = player();
        let mut shots = Vec::new();
        assert!(p.start_dash(Vec2::X));
        p.update(0.1, 0.1, &[], &mut shots);
        assert!(p.is_dashing());
        p.update(0.1, 0.2, &[], &mut shots);
        assert!(!p.is_dashing());
        assert!((p.body.pos.x - 3.0).abs() < 1e-5);
        // Cooldown kept running during the dash
        assert!((p.dash_cooldown - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_movement_ignored_while_dashing() {
        let mut p = player();
        let mut shots = Vec::new();
        p.track_held(InputEvent::KeyDown(MoveKey::Up));
        p.start_dash(Vec2::X);
        p.update(0.1, 0.1, &[], &mut shots);
        assert_eq!(p.body.pos.y, 0.0);
        assert!(p.body.pos.x > 0.0);
    }

    #[test]
    fn test_dash_grants_invulnerability() {
        let mut p = player();
        p.start_dash(Vec2::Y);
        assert_eq!(p.take_damage(50.0), 0.0);
        assert_eq!(p.health, 100.0);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut p = player();
        assert_eq!(p.take_damage(30.0), 30.0);
        assert_eq!(p.take_damage(500.0), 70.0);
        assert_eq!(p.health, 0.0);
    }

    #[test]
    fn test_lone_press_fires_single_after_window() {
        let mut p = player();
        let mut shots = Vec::new();
        press(&mut p, InputEvent::ShootDown, 0.0, &mut shots);
        assert!(shots.is_empty());
        p.update(0.1, 0.1, &[], &mut shots);
        p.update(0.1, 0.2, &[], &mut shots);
        assert!(shots.is_empty());
        let fired = p.update(0.1, 0.3, &[], &mut shots);
        assert_eq!(fired.bullets_fired, 1);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].direction, Vec2::Y);
    }

    #[test]
    fn test_double_click_fires_burst_only() {
        let mut p = player();
        let mut shots = Vec::new();
        press(&mut p, InputEvent::ShootDown, 0.0, &mut shots);
        press(&mut p, InputEvent::ShootUp, 0.1, &mut shots);
        let burst = press(&mut p, InputEvent::ShootDown, 0.2, &mut shots);
        assert_eq!(burst.bullets_fired, 2);
        assert_eq!(shots.len(), 2);
        for step in 1..=10 {
            p.update(0.1, 0.2 + step as f64 * 0.1, &[], &mut shots);
        }
        assert_eq!(shots.len(), 2);
    }

    #[test]
    fn test_burst_is_fanned_and_offset() {
        let mut p = player();
        let mut shots = Vec::new();
        p.shoot(2, &[], &mut shots);
        assert_eq!(shots.len(), 2);
        let angle = shots[0].direction.angle_to(shots[1].direction).abs();
        assert!((angle - 0.3).abs() < 1e-4);
        assert!((shots[0].origin.x + 0.1).abs() < 1e-6);
        assert!((shots[1].origin.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_press_during_cooldown_is_ignored() {
        let mut p = player();
        let mut shots = Vec::new();
        p.shoot(1, &[], &mut shots);
        press(&mut p, InputEvent::ShootDown, 0.0, &mut shots);
        assert!(!p.has_pending_shot());
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn test_cooldowns_expire_on_exact_tick() {
        let mut p = player();
        let mut shots = Vec::new();
        assert_eq!(p.shoot(1, &[], &mut shots), 1);
        p.start_dash(Vec2::X);
        // 0.4 s shoot cooldown is 48 ticks, 0.7 s dash cooldown is 84
        for i in 1..48 {
            p.update(SIM_DT, i as f64 * SIM_DT as f64, &[], &mut shots);
        }
        assert_eq!(p.shoot(1, &[], &mut shots), 0);
        p.update(SIM_DT, 48.0 * SIM_DT as f64, &[], &mut shots);
        assert_eq!(p.shoot(1, &[], &mut shots), 1);

        for i in 49..84 {
            p.update(SIM_DT, i as f64 * SIM_DT as f64, &[], &mut shots);
        }
        assert!(p.dash_cooldown > 0.0);
        p.update(SIM_DT, 84.0 * SIM_DT as f64, &[], &mut shots);
        assert_eq!(p.dash_cooldown, 0.0);
    }

    #[test]
    fn test_shoot_without_targets_uses_facing() {
        let mut p = player();
        p.last_direction = Vec2::NEG_X;
        let mut shots = Vec::new();
        assert_eq!(p.shoot(1, &[], &mut shots), 1);
        assert_eq!(shots[0].direction, Vec2::NEG_X);
        assert_eq!(shots[0].speed, 10.0);
        assert_eq!(p.shoot(1, &[], &mut shots), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut p = player();
        p.body.pos = Vec2::new(4.0, 4.0);
        p.take_damage(40.0);
        p.start_dash(Vec2::X);
        p.last_direction = Vec2::X;
        p.track_held(InputEvent::KeyDown(MoveKey::A));
        p.reset();
        assert_eq!(p.health, 100.0);
        assert_eq!(p.body.pos, Vec2::ZERO);
        assert!(!p.is_dashing());
        assert_eq!(p.dash_cooldown, 0.0);
        assert_eq!(p.last_direction, Vec2::Y);
        assert_eq!(p.held_direction(), Vec2::ZERO);
        assert_eq!(p.body.id, 1);
    }

    proptest! {
        #[test]
        fn prop_dashing_player_never_loses_health(amount in 0.0f32..500.0, dir in 0.0f32..6.28) {
            let mut p = player();
            p.start_dash(Vec2::from_angle(dir));
            p.take_damage(amount);
            prop_assert_eq!(p.health, 100.0);
        }

        #[test]
        fn prop_position_stays_in_field(steps in proptest::collection::vec((0usize..8, 0.0f32..0.5), 1..40)) {
            let mut p = player();
            let mut shots = Vec::new();
            let mut now = 0.0f64;
            for (key, dt) in steps {
                p.track_held(InputEvent::KeyDown(MoveKey::ALL[key]));
                now += f64::from(dt);
                p.update(dt, now, &[], &mut shots);
                prop_assert!(p.body.pos.x.abs() <= 15.0 && p.body.pos.y.abs() <= 8.0);
            }
        }
    }
}
