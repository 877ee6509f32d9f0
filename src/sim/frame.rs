//! Per-frame snapshot handed to render/audio/UI collaborators

use serde::Serialize;

use super::encounter::BossKind;
use super::ending::EndingPhase;
use super::player::JumpState;
use super::rect::Rect;
use super::state::{
    Collectible, DeathCause, FlyingEnemy, GameEvent, GameState, Obstacle, Platform, Projectile,
};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerFrame {
    pub rect: Rect,
    pub jump_state: JumpState,
    pub jumps_remaining: u8,
    pub shield_active: bool,
    pub shield_ms_left: f64,
    /// Shield charges available right now
    pub shield_charges: u32,
    pub dash_active: bool,
    pub dash_ms_left: f64,
    pub dash_cooldown_ms_left: f64,
    pub dash_charges: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterStatus {
    pub kind: BossKind,
    pub level: u32,
    pub rect: Rect,
    pub remaining_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndingFrame {
    pub phase: EndingPhase,
    pub npc: Option<Rect>,
    /// Overlay opacity (0-1)
    pub fade: f32,
    pub dialogue: Option<&'static str>,
}

/// Everything a collaborator may read about one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameState {
    pub time_ms: f64,
    pub score: u32,
    pub speed: f32,
    pub player: PlayerFrame,
    pub obstacles: Vec<Obstacle>,
    pub flyers: Vec<FlyingEnemy>,
    pub platforms: Vec<Platform>,
    pub projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    pub run_over: bool,
    pub cause: Option<DeathCause>,
    /// Active bosses, ground first
    pub encounters: Vec<EncounterStatus>,
    /// Present once the ending has started
    pub ending: Option<EndingFrame>,
    /// Events emitted since the previous frame
    pub events: Vec<GameEvent>,
}

impl FrameState {
    pub fn capture(state: &GameState, events: Vec<GameEvent>) -> Self {
        let player = &state.player;
        let now = state.time_ms;
        Self {
            time_ms: now,
            score: state.score,
            speed: state.speed(),
            player: PlayerFrame {
                rect: player.rect,
                jump_state: player.jump_state,
                jumps_remaining: player.jumps_remaining,
                shield_active: player.shield_active(),
                shield_ms_left: player.shield_ms_left,
                shield_charges: state.shield_charges(),
                dash_active: player.dash_active(),
                dash_ms_left: player.dash_ms_left,
                dash_cooldown_ms_left: player.dash_cooldown_ms_left,
                dash_charges: player.dash_charges,
            },
            obstacles: state.pools.obstacles.clone(),
            flyers: state.pools.flyers.clone(),
            platforms: state.pools.platforms.clone(),
            projectiles: state.pools.projectiles.clone(),
            collectibles: state.pools.collectibles.clone(),
            run_over: state.is_over(),
            cause: state.outcome,
            encounters: state
                .encounters
                .active()
                .map(|b| EncounterStatus {
                    kind: b.kind,
                    level: b.level,
                    rect: b.rect,
                    remaining_ms: b.remaining_ms(now),
                })
                .collect(),
            ending: state.ending.is_active().then(|| EndingFrame {
                phase: state.ending.phase,
                npc: state.ending.npc,
                fade: state.ending.fade,
                dialogue: state.ending.dialogue_line(),
            }),
            events,
        }
    }

    /// The active boss of `kind`, if any
    pub fn encounter(&self, kind: BossKind) -> Option<&EncounterStatus> {
        self.encounters.iter().find(|e| e.kind == kind)
    }
}
