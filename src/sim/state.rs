//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]. Entities are owned by
//! their pool in [`Pools`]; they are created by the spawn scheduler or a
//! boss, moved in place each tick and removed once off-screen or consumed.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::encounter::{BossKind, EncounterDirector};
use super::ending::{EndingDirector, EndingPhase};
use super::player::Player;
use super::rect::Rect;
use super::spawn::SpawnScheduler;
use crate::tuning::Tuning;

/// RNG stream used by the spawn scheduler
pub const SPAWN_STREAM: u64 = 0x5eed_0001;
/// RNG stream used by the encounter director
pub const ENCOUNTER_STREAM: u64 = 0x5eed_0002;

/// Ground obstacle size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Normal,
    Xl,
    Xxl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub rect: Rect,
    /// Leftward speed (pixels per frame)
    pub speed: f32,
}

/// Flying enemy subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlyingKind {
    Bird,
    Saucer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlyingEnemy {
    pub id: u32,
    pub kind: FlyingKind,
    pub rect: Rect,
    pub speed: f32,
    /// Resting y the bob oscillates around
    pub base_y: f32,
    pub bob_amplitude: f32,
    pub bob_phase: f32,
}

impl FlyingEnemy {
    pub fn advance(&mut self, scale: f32) {
        self.rect.x -= self.speed * scale;
        if self.bob_amplitude > 0.0 {
            self.bob_phase += 0.08 * scale;
            self.rect.y = self.base_y + self.bob_phase.sin() * self.bob_amplitude;
        }
    }
}

/// Platform width classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformSize {
    Short,
    Medium,
    Long,
}

impl PlatformSize {
    pub const ALL: [PlatformSize; 3] = [PlatformSize::Short, PlatformSize::Medium, PlatformSize::Long];

    pub fn index(self) -> usize {
        match self {
            PlatformSize::Short => 0,
            PlatformSize::Medium => 1,
            PlatformSize::Long => 2,
        }
    }
}

/// A floating platform the player can stand on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub size: PlatformSize,
    pub rect: Rect,
    pub speed: f32,
}

/// Boss projectile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Thrown by the ground boss
    Fireball,
    /// Fired by the flying boss
    PlasmaBolt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub rect: Rect,
    /// Velocity in pixels per frame
    pub vel: Vec2,
    /// Heading in radians, for sprite rotation
    pub rotation: f32,
}

impl Projectile {
    pub fn advance(&mut self, scale: f32) {
        self.rect.x += self.vel.x * scale;
        self.rect.y += self.vel.y * scale;
    }
}

/// Dash fuel pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub rect: Rect,
    pub speed: f32,
    /// Set when the player picks it up; swept on the next eviction pass
    pub collected: bool,
}

/// All entity pools, in stable spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pools {
    pub obstacles: Vec<Obstacle>,
    pub flyers: Vec<FlyingEnemy>,
    pub platforms: Vec<Platform>,
    pub projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    next_id: u32,
}

impl Pools {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// True when every pool is empty
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
            && self.flyers.is_empty()
            && self.platforms.is_empty()
            && self.projectiles.is_empty()
            && self.collectibles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
            + self.flyers.len()
            + self.platforms.len()
            + self.projectiles.len()
            + self.collectibles.len()
    }
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Obstacle(ObstacleKind),
    Flyer(FlyingKind),
    Projectile(ProjectileKind),
    Boss(BossKind),
    /// The ending sequence finished; a successful run
    EndingComplete,
}

impl DeathCause {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DeathCause::EndingComplete)
    }
}

/// Discrete events emitted during a tick, for audio/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// `count` is 1 for the ground jump, 2 and 3 for air jumps
    Jumped { count: u8 },
    ShieldActivated { auto: bool },
    ShieldExpired,
    DashStarted,
    DashEnded,
    CollectiblePicked { dash_charges: u32 },
    ObstaclePassed { score: u32 },
    BossStarted { kind: BossKind, level: u32 },
    BossDefeated { kind: BossKind, level: u32 },
    ProjectileFired { kind: ProjectileKind },
    EndingStarted,
    EndingPhaseChanged { phase: EndingPhase },
    RunEnded { cause: DeathCause },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation clock (ms since run start)
    pub time_ms: f64,
    /// Simulation step counter
    pub time_ticks: u64,
    pub score: u32,
    /// Set once the run is over
    pub outcome: Option<DeathCause>,
    pub player: Player,
    pub pools: Pools,
    pub spawner: SpawnScheduler,
    pub encounters: EncounterDirector,
    pub ending: EndingDirector,
    /// Events emitted since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh run. `tuning` is assumed validated.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let spawner = SpawnScheduler::new(Pcg32::new(seed, SPAWN_STREAM), &tuning);
        let encounters = EncounterDirector::new(Pcg32::new(seed, ENCOUNTER_STREAM));
        Self {
            seed,
            player: Player::new(&tuning),
            tuning,
            time_ms: 0.0,
            time_ticks: 0,
            score: 0,
            outcome: None,
            pools: Pools::new(),
            spawner,
            encounters,
            ending: EndingDirector::new(),
            events: Vec::new(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Current scroll speed
    pub fn speed(&self) -> f32 {
        self.tuning.world.speed_for_score(self.score)
    }

    /// Shield charges currently available
    pub fn shield_charges(&self) -> u32 {
        self.player
            .available_shield_charges(self.score, self.tuning.player.shield_score_step)
    }

    /// End the run with `cause` (no-op if already over)
    pub fn end_run(&mut self, cause: DeathCause) {
        if self.outcome.is_some() {
            return;
        }
        if cause.is_fatal() {
            log::info!("Run over at score {}: {:?}", self.score, cause);
        } else {
            log::info!("Run complete at score {}", self.score);
        }
        self.outcome = Some(cause);
        self.events.push(GameEvent::RunEnded { cause });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique_and_increasing() {
        let mut pools = Pools::new();
        let a = pools.next_entity_id();
        let b = pools.next_entity_id();
        assert_eq!(a, 1);
        assert!(b > a);
    }

    #[test]
    fn test_pools_empty() {
        let mut pools = Pools::new();
        assert!(pools.is_empty());
        let id = pools.next_entity_id();
        pools.collectibles.push(Collectible {
            id,
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            speed: 1.0,
            collected: false,
        });
        assert!(!pools.is_empty());
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn test_end_run_is_sticky() {
        let mut state = GameState::new(7, Tuning::default());
        state.end_run(DeathCause::Obstacle(ObstacleKind::Normal));
        state.end_run(DeathCause::EndingComplete);
        assert_eq!(state.outcome, Some(DeathCause::Obstacle(ObstacleKind::Normal)));
        assert_eq!(
            state.events,
            vec![GameEvent::RunEnded {
                cause: DeathCause::Obstacle(ObstacleKind::Normal)
            }]
        );
    }

    #[test]
    fn test_saucer_bobs_around_base() {
        let mut saucer = FlyingEnemy {
            id: 1,
            kind: FlyingKind::Saucer,
            rect: Rect::new(100.0, 150.0, 40.0, 20.0),
            speed: 7.0,
            base_y: 150.0,
            bob_amplitude: 10.0,
            bob_phase: 0.0,
        };
        for _ in 0..100 {
            saucer.advance(1.0);
            assert!((saucer.rect.y - 150.0).abs() <= 10.0 + 1e-4);
        }
        assert!((saucer.rect.x - (100.0 - 700.0)).abs() < 1e-3);
    }
}
