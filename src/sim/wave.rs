//! Wave director
//!
//! Issues enemy spawns on a per-level cadence and walks the level table:
//! Spawning → LevelComplete → (delay) → Spawning(next) … → GameComplete.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use crate::timer_elapsed;
use crate::tuning::WaveTuning;

/// Edge bands enemies enter from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl SpawnSide {
    const ALL: [SpawnSide; 4] = [SpawnSide::Top, SpawnSide::Right, SpawnSide::Bottom, SpawnSide::Left];

    fn pick(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Random point in this band
    fn point(self, rng: &mut impl Rng) -> Vec2 {
        let across = (rng.random::<f32>() - 0.5) * 30.0;
        let down = (rng.random::<f32>() - 0.5) * 16.0;
        match self {
            SpawnSide::Top => Vec2::new(across, 10.0),
            SpawnSide::Right => Vec2::new(16.0, down),
            SpawnSide::Bottom => Vec2::new(across, -10.0),
            SpawnSide::Left => Vec2::new(-16.0, down),
        }
    }
}

/// An enemy the orchestrator should create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub melee_speed: f32,
    pub bullet_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveEvent {
    Spawn(EnemySpawn),
    LevelComplete { level: u32 },
    GameComplete { level: u32 },
    LevelStarted { level: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    tuning: WaveTuning,
    /// 1-based
    pub current_level: u32,
    pub enemies_spawned: u32,
    pub total_enemies_for_level: u32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub melee_speed: f32,
    pub bullet_speed: f32,
    pub level_timer: f32,
    pub is_spawning: bool,
    pub is_level_complete: bool,
    pub is_game_complete: bool,
}

impl WaveDirector {
    pub fn new(tuning: WaveTuning) -> Self {
        let mut director = Self {
            tuning,
            current_level: 1,
            enemies_spawned: 0,
            total_enemies_for_level: 0,
            spawn_timer: 0.0,
            spawn_interval: 0.0,
            melee_speed: 0.0,
            bullet_speed: 0.0,
            level_timer: 0.0,
            is_spawning: false,
            is_level_complete: false,
            is_game_complete: false,
        };
        director.setup_level();
        director
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    pub fn level_count(&self) -> u32 {
        self.tuning.levels.len() as u32
    }

    fn setup_level(&mut self) {
        let Some(config) = self.tuning.level(self.current_level).copied() else {
            self.is_game_complete = true;
            self.is_spawning = false;
            return;
        };

        self.total_enemies_for_level = config.enemy_count;
        self.spawn_interval = config.spawn_interval;
        self.melee_speed = config.melee_speed;
        self.bullet_speed = self.tuning.bullet_speed(self.current_level);

        self.enemies_spawned = 0;
        self.spawn_timer = 0.0;
        self.level_timer = 0.0;
        self.is_level_complete = false;
        self.is_spawning = true;

        log::info!(
            "Level {}: {} enemies every {}s, melee speed {}, bullet speed {}",
            self.current_level,
            self.total_enemies_for_level,
            self.spawn_interval,
            self.melee_speed,
            self.bullet_speed
        );
    }

    /// Enemies still to beat this level (alive plus not yet spawned)
    pub fn remaining_enemies(&self, alive: usize) -> u32 {
        alive as u32 + self.total_enemies_for_level.saturating_sub(self.enemies_spawned)
    }

    /// Advance one tick given the number of live enemies
    pub fn update(&mut self, dt: f32, alive: usize, rng: &mut impl Rng, events: &mut Vec<WaveEvent>) {
        if self.is_game_complete {
            return;
        }

        // Completion only counts once the whole quota has been issued
        if self.is_spawning
            && !self.is_level_complete
            && self.enemies_spawned >= self.total_enemies_for_level
            && alive == 0
        {
            self.complete_level(events);
            return;
        }

        if self.is_spawning && self.enemies_spawned < self.total_enemies_for_level {
            self.spawn_timer += dt;
            if timer_elapsed(self.spawn_timer, self.spawn_interval) {
                events.push(WaveEvent::Spawn(self.spawn_enemy(rng)));
                self.spawn_timer = 0.0;
            }
        }

        if self.is_level_complete && !self.is_spawning && !self.tuning.hold_between_levels {
            self.level_timer += dt;
            if timer_elapsed(self.level_timer, self.tuning.level_delay) {
                self.start_next_level(events);
            }
        }
    }

    fn complete_level(&mut self, events: &mut Vec<WaveEvent>) {
        self.is_level_complete = true;
        self.is_spawning = false;
        let level = self.current_level;

        if level >= self.level_count() {
            self.is_game_complete = true;
            log::info!("Final level {} cleared", level);
            events.push(WaveEvent::GameComplete { level });
        } else {
            log::info!("Level {} complete", level);
            events.push(WaveEvent::LevelComplete { level });
        }
    }

    /// Start the next level right away. Only valid between levels.
    pub fn advance_level(&mut self, events: &mut Vec<WaveEvent>) -> bool {
        if !self.is_level_complete || self.is_game_complete {
            return false;
        }
        self.start_next_level(events);
        true
    }

    fn start_next_level(&mut self, events: &mut Vec<WaveEvent>) {
        self.current_level += 1;
        self.setup_level();
        if !self.is_game_complete {
            events.push(WaveEvent::LevelStarted {
                level: self.current_level,
            });
        }
    }

    fn spawn_enemy(&mut self, rng: &mut impl Rng) -> EnemySpawn {
        let pos = SpawnSide::pick(rng).point(rng);
        let kind = if rng.random_bool(self.tuning.melee_chance) {
            EnemyKind::MeleeStriker
        } else {
            EnemyKind::RangedOrbiter
        };
        self.enemies_spawned += 1;
        log::debug!(
            "Spawn {:?} at ({:.1}, {:.1}) [{}/{}]",
            kind,
            pos.x,
            pos.y,
            self.enemies_spawned,
            self.total_enemies_for_level
        );
        EnemySpawn {
            kind,
            pos,
            melee_speed: self.melee_speed,
            bullet_speed: self.bullet_speed,
        }
    }
}
