//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Deferred actions stored as due times on the tick clock
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod gesture;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod wave;

pub use autopilot::autopilot_events;
pub use collision::{circles_overlap, direction_to, within_scaled_reach};
pub use enemy::{ContactPolicy, Enemy, EnemyKind, MeleePhase};
pub use entity::{Body, Entity};
pub use gesture::{ClickBurst, DoubleTap, Volley};
pub use player::{DashPhase, InputEvent, MoveKey, Player, PlayerActions};
pub use projectile::{Owner, Projectile, ShotRequest};
pub use state::{EntityKind, EntitySnapshot, GameEvent, GamePhase, GameState, HealthBand, Hud};
pub use tick::{TickInput, tick};
pub use wave::{EnemySpawn, SpawnSide, WaveDirector, WaveEvent};
