//! Game state and core simulation types
//!
//! Everything needed to reproduce a run lives here: seed, RNG, tuning and
//! every entity list.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::entity::Entity;
use super::player::Player;
use super::projectile::{Owner, Projectile, ShotRequest};
use super::wave::{EnemySpawn, WaveDirector, WaveEvent};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Player died
    GameOver,
    /// Last level cleared
    Complete,
}

/// Renderable entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    RangedOrbiter,
    MeleeStriker,
    PlayerShot,
    EnemyShot,
}

impl From<EnemyKind> for EntityKind {
    fn from(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::RangedOrbiter => EntityKind::RangedOrbiter,
            EnemyKind::MeleeStriker => EntityKind::MeleeStriker,
        }
    }
}

impl From<Owner> for EntityKind {
    fn from(owner: Owner) -> Self {
        match owner {
            Owner::Player => EntityKind::PlayerShot,
            Owner::Enemy => EntityKind::EnemyShot,
        }
    }
}

/// Things that happened, for the renderer and UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: u32, kind: EntityKind },
    Despawned { id: u32 },
    PlayerDamaged { amount: f32, health: f32 },
    DashStarted,
    Shot { count: u32 },
    LevelComplete { level: u32 },
    LevelStarted { level: u32 },
    GameComplete,
    GameOver,
}

/// Health bar color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthBand {
    Green,
    Yellow,
    Red,
}

/// Values the UI shows, republished every tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hud {
    pub health: f32,
    pub level: u32,
    pub enemies_remaining: u32,
    pub dash_cooldown_remaining: f32,
}

impl Hud {
    pub fn dash_label(&self) -> String {
        if self.dash_cooldown_remaining <= 0.0 {
            "DASH: Ready".to_string()
        } else {
            format!("DASH: {}s", self.dash_cooldown_remaining.ceil() as u32)
        }
    }

    pub fn health_band(&self) -> HealthBand {
        if self.health > 60.0 {
            HealthBand::Green
        } else if self.health > 30.0 {
            HealthBand::Yellow
        } else {
            HealthBand::Red
        }
    }
}

/// Per-entity render data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Horizontal mirror (-1 or 1)
    pub facing: f32,
    /// Rotation hint (radians)
    pub tilt: f32,
    pub opacity: f32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation clock (seconds); input events are stamped with it
    pub clock: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Active enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub director: WaveDirector,
    /// Latest HUD values
    pub hud: Hud,
    pub(crate) events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(1, tuning.player, tuning.projectiles.player_speed);
        let director = WaveDirector::new(tuning.waves.clone());
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Running,
            clock: 0.0,
            time_ticks: 0,
            player,
            enemies: Vec::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            director,
            hud: Hud::default(),
            events: Vec::new(),
            next_id: 2,
        };
        state.events.push(GameEvent::Spawned {
            id: state.player.id(),
            kind: EntityKind::Player,
        });
        state.publish_hud();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events recorded since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn remaining_enemies(&self) -> u32 {
        self.director.remaining_enemies(self.alive_enemies())
    }

    pub fn spawn_enemy(&mut self, spawn: EnemySpawn) -> u32 {
        let id = self.next_entity_id();
        let enemy = match spawn.kind {
            EnemyKind::RangedOrbiter => Enemy::ranged(id, spawn.pos, spawn.bullet_speed, &self.tuning.ranged),
            EnemyKind::MeleeStriker => Enemy::melee(id, spawn.pos, spawn.melee_speed, &self.tuning.melee),
        };
        self.enemies.push(enemy);
        self.emit(GameEvent::Spawned {
            id,
            kind: spawn.kind.into(),
        });
        id
    }

    pub fn spawn_projectile(&mut self, request: ShotRequest) -> u32 {
        let id = self.next_entity_id();
        let t = &self.tuning.projectiles;
        let (radius, damage) = match request.owner {
            Owner::Player => (t.player_radius, t.player_damage),
            Owner::Enemy => (t.enemy_radius, t.enemy_damage),
        };
        let shot = Projectile::new(
            id,
            request.owner,
            request.origin,
            request.direction,
            request.speed,
            radius,
            damage,
        );
        match request.owner {
            Owner::Player => self.player_shots.push(shot),
            Owner::Enemy => self.enemy_shots.push(shot),
        }
        self.emit(GameEvent::Spawned {
            id,
            kind: request.owner.into(),
        });
        id
    }

    /// Destroy every enemy projectile (pruned at the end of the tick)
    pub fn clear_enemy_shots(&mut self) {
        for shot in &mut self.enemy_shots {
            shot.destroy();
        }
    }

    /// Apply one director event
    pub(crate) fn apply_wave_event(&mut self, event: WaveEvent) {
        match event {
            WaveEvent::Spawn(spawn) => {
                self.spawn_enemy(spawn);
            }
            WaveEvent::LevelComplete { level } => {
                self.clear_enemy_shots();
                self.emit(GameEvent::LevelComplete { level });
            }
            WaveEvent::GameComplete { level } => {
                self.clear_enemy_shots();
                if self.phase == GamePhase::Running {
                    self.phase = GamePhase::Complete;
                }
                log::info!("All {} levels cleared", level);
                self.emit(GameEvent::GameComplete);
            }
            WaveEvent::LevelStarted { level } => {
                self.clear_enemy_shots();
                self.emit(GameEvent::LevelStarted { level });
            }
        }
    }

    /// Drop destroyed entities, emitting a despawn event for each
    pub(crate) fn prune(&mut self) {
        let events = &mut self.events;
        let mut keep = |alive: bool, id: u32| {
            if !alive {
                events.push(GameEvent::Despawned { id });
            }
            alive
        };
        self.enemies.retain(|e| keep(e.is_alive(), e.id()));
        self.player_shots.retain(|s| keep(s.is_alive(), s.id()));
        self.enemy_shots.retain(|s| keep(s.is_alive(), s.id()));
    }

    pub(crate) fn publish_hud(&mut self) {
        self.hud = Hud {
            health: self.player.health,
            level: self.director.current_level.min(self.director.level_count()),
            enemies_remaining: self.remaining_enemies(),
            dash_cooldown_remaining: self.player.dash_cooldown,
        };
    }

    /// Render data for every live entity
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        let mut out = Vec::with_capacity(1 + self.enemies.len() + self.player_shots.len() + self.enemy_shots.len());

        if self.player.is_alive() {
            out.push(EntitySnapshot {
                id: self.player.id(),
                kind: EntityKind::Player,
                pos: self.player.pos(),
                radius: self.player.radius(),
                facing: self.player.facing,
                tilt: self.player.tilt,
                opacity: self.player.opacity(),
            });
        }

        out.extend(self.enemies.iter().filter(|e| e.is_alive()).map(|e| EntitySnapshot {
            id: e.id(),
            kind: e.kind().into(),
            pos: e.pos(),
            radius: e.radius(),
            facing: e.facing,
            tilt: 0.0,
            opacity: e.opacity(),
        }));

        out.extend(
            self.player_shots
                .iter()
                .chain(&self.enemy_shots)
                .filter(|s| s.is_alive())
                .map(|s| EntitySnapshot {
                    id: s.id(),
                    kind: s.owner.into(),
                    pos: s.pos(),
                    radius: s.radius(),
                    facing: 1.0,
                    tilt: s.direction.to_angle(),
                    opacity: 1.0,
                }),
        );

        out
    }

    // Shell commands

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Paused;
            log::debug!("Paused at {:.3}s", self.clock);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Running;
            log::debug!("Resumed at {:.3}s", self.clock);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            GamePhase::GameOver | GamePhase::Complete => {}
        }
    }

    /// Start over from level 1 with the run seed
    pub fn restart(&mut self) {
        if self.player.is_alive() {
            self.events.push(GameEvent::Despawned { id: self.player.id() });
        }
        for enemy in &mut self.enemies {
            enemy.destroy();
        }
        for shot in self.player_shots.iter_mut().chain(&mut self.enemy_shots) {
            shot.destroy();
        }
        self.prune();

        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = GamePhase::Running;
        self.clock = 0.0;
        self.time_ticks = 0;
        self.next_id = 2;
        self.player.reset();
        self.director.reset();
        self.events.push(GameEvent::Spawned {
            id: self.player.id(),
            kind: EntityKind::Player,
        });
        self.publish_hud();
        log::info!("Restarted with seed {}", self.seed);
    }

    /// Start the next level now (only between levels)
    pub fn advance_level(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        let mut wave_events = Vec::new();
        if !self.director.advance_level(&mut wave_events) {
            return false;
        }
        for event in wave_events {
            self.apply_wave_event(event);
        }
        self.prune();
        self.publish_hud();
        true
    }

    // Queries

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_level_complete(&self) -> bool {
        self.director.is_level_complete
    }

    pub fn is_game_complete(&self) -> bool {
        self.director.is_game_complete
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }
}
