//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool order, then entity ID)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod encounter;
pub mod ending;
pub mod frame;
pub mod player;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::Simulation;
pub use collision::{Collidable, HitRegions, check_hit};
pub use encounter::{Boss, BossKind, EncounterDirector};
pub use ending::{EndingDirector, EndingPhase};
pub use frame::{EncounterStatus, EndingFrame, FrameState, PlayerFrame};
pub use player::{JumpState, Player};
pub use rect::Rect;
pub use spawn::SpawnScheduler;
pub use state::{
    Collectible, DeathCause, FlyingEnemy, FlyingKind, GameEvent, GameState, Obstacle, ObstacleKind,
    Platform, PlatformSize, Pools, Projectile, ProjectileKind,
};
pub use tick::{TickInput, tick};
