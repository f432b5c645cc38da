//! Data-driven game balance
//!
//! Every balance number the simulation uses lives here. Tuning files are
//! JSON; sections and fields that are missing keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating tuning
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Player movement, dash, gestures and weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub radius: f32,
    /// Units per second per held axis
    pub speed: f32,

    // === Dash ===
    pub dash_distance: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Window for a second press of the same movement key
    pub double_tap_window: f32,

    // === Shooting ===
    pub shoot_cooldown: f32,
    /// Window for a second shoot press to turn into a burst
    pub double_click_window: f32,
    pub burst_count: u32,
    /// Total fan angle of a burst (radians)
    pub burst_spread: f32,
    /// Horizontal spacing between burst bullets at spawn
    pub burst_offset: f32,
    /// Weight of facing alignment when picking a target
    pub aim_bias: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            radius: 1.5,
            speed: 6.0,

            dash_distance: 3.0,
            dash_duration: 0.2,
            dash_cooldown: 0.7,
            double_tap_window: 0.5,

            shoot_cooldown: 0.4,
            double_click_window: 0.3,
            burst_count: 2,
            burst_spread: 0.3,
            burst_offset: 0.2,
            aim_bias: 2.0,
        }
    }
}

/// Projectile stats for both owners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub player_speed: f32,
    pub player_radius: f32,
    pub player_damage: f32,
    pub enemy_radius: f32,
    pub enemy_damage: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 10.0,
            player_radius: 0.15,
            player_damage: 1.0,
            enemy_radius: 0.2,
            enemy_damage: 20.0,
        }
    }
}

/// Ranged orbiter stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    pub health: f32,
    pub radius: f32,
    pub speed: f32,
    pub shoot_interval: f32,
    /// Damage dealt to the player on body contact
    pub touch_damage: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            health: 1.0,
            radius: 0.8,
            speed: 2.0,
            shoot_interval: 2.0,
            touch_damage: 1.0,
        }
    }
}

/// Melee striker stats (speed comes from the level table)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    pub health: f32,
    pub radius: f32,
    pub melee_range: f32,
    pub min_dash_distance: f32,
    pub dash_speed_factor: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Fraction of the dash that must elapse before it can hit
    pub hit_window_start: f32,
    /// Multiplier on combined radii for the dash hit test
    pub hit_radius_factor: f32,
    pub dash_damage: f32,
    pub retreat_speed_factor: f32,
    pub retreat_duration: f32,
    pub hit_flash: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            health: 2.0,
            radius: 0.8,
            melee_range: 3.5,
            min_dash_distance: 2.8,
            dash_speed_factor: 4.0,
            dash_duration: 0.3,
            dash_cooldown: 2.0,
            hit_window_start: 0.2,
            hit_radius_factor: 0.8,
            dash_damage: 25.0,
            retreat_speed_factor: 0.7,
            retreat_duration: 1.0,
            hit_flash: 0.1,
        }
    }
}

/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub enemy_count: u32,
    pub melee_speed: f32,
    pub spawn_interval: f32,
}

impl LevelConfig {
    pub const fn new(enemy_count: u32, melee_speed: f32, spawn_interval: f32) -> Self {
        Self {
            enemy_count,
            melee_speed,
            spawn_interval,
        }
    }
}

/// Wave director settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub levels: Vec<LevelConfig>,
    pub base_bullet_speed: f32,
    pub bullet_speed_per_level: f32,
    /// Probability that a spawn is a melee striker
    pub melee_chance: f64,
    /// Seconds between clearing a level and starting the next
    pub level_delay: f32,
    /// Wait for an explicit advance instead of the delay
    pub hold_between_levels: bool,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig::new(12, 1.5, 2.0),
                LevelConfig::new(20, 2.0, 1.5),
                LevelConfig::new(32, 2.5, 1.2),
                LevelConfig::new(48, 3.0, 1.0),
                LevelConfig::new(60, 3.5, 0.8),
            ],
            base_bullet_speed: 6.0,
            bullet_speed_per_level: 0.8,
            melee_chance: 0.4,
            level_delay: 2.0,
            hold_between_levels: false,
        }
    }
}

impl WaveTuning {
    /// Enemy bullet speed for a 1-based level
    pub fn bullet_speed(&self, level: u32) -> f32 {
        self.base_bullet_speed + level.saturating_sub(1) as f32 * self.bullet_speed_per_level
    }

    /// Level row for a 1-based level
    pub fn level(&self, level: u32) -> Option<&LevelConfig> {
        let idx = (level as usize).checked_sub(1)?;
        self.levels.get(idx)
    }
}

/// All balance values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectiles: ProjectileTuning,
    pub ranged: RangedTuning,
    pub melee: MeleeTuning,
    pub waves: WaveTuning,
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        let positive = [
            ("player.max_health", p.max_health),
            ("player.radius", p.radius),
            ("player.dash_duration", p.dash_duration),
            ("player.double_tap_window", p.double_tap_window),
            ("player.double_click_window", p.double_click_window),
            ("projectiles.player_speed", self.projectiles.player_speed),
            ("ranged.health", self.ranged.health),
            ("ranged.shoot_interval", self.ranged.shoot_interval),
            ("melee.health", self.melee.health),
            ("melee.dash_duration", self.melee.dash_duration),
            ("melee.retreat_duration", self.melee.retreat_duration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if p.burst_count == 0 {
            return Err(invalid("player.burst_count must be at least 1".into()));
        }
        if self.melee.min_dash_distance > self.melee.melee_range {
            return Err(invalid(format!(
                "melee.min_dash_distance {} exceeds melee.melee_range {}",
                self.melee.min_dash_distance, self.melee.melee_range
            )));
        }

        let w = &self.waves;
        if w.levels.is_empty() {
            return Err(invalid("waves.levels must not be empty".into()));
        }
        for (i, level) in w.levels.iter().enumerate() {
            if level.enemy_count == 0 || !(level.spawn_interval > 0.0) {
                return Err(invalid(format!(
                    "level {} needs enemies and a positive spawn interval",
                    i + 1
                )));
            }
        }
        if !(0.0..=1.0).contains(&w.melee_chance) {
            return Err(invalid(format!(
                "waves.melee_chance must be within [0, 1], got {}",
                w.melee_chance
            )));
        }
        if w.level_delay < 0.0 {
            return Err(invalid("waves.level_delay must not be negative".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> TuningError {
    log::warn!("Rejected tuning: {}", msg);
    TuningError::Invalid(msg)
}
