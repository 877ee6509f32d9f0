//! Scripted finale
//!
//! Once the terminal score is reached the run stops spawning, waits for the
//! screen to clear, then plays a fixed sequence: an NPC walks in, four lines
//! of dialogue, both characters walk off, the screen fades and a final
//! message holds before the run completes. Phases advance one at a time in
//! declaration order, each on a monotonic exit condition.

use serde::{Deserialize, Serialize};

use super::player::Player;
use super::rect::Rect;
use super::state::GameEvent;
use crate::tuning::Tuning;

/// Dialogue shown during the `Dialogue(n)` phases
pub const DIALOGUE: [&str; 4] = [
    "You made it through the canyon!",
    "The mothership is waiting beyond the ridge.",
    "They never stopped chasing you, did they?",
    "Come on. Let's go home.",
];

/// Gap between the player and the NPC once it has walked in
const NPC_STOP_GAP: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingPhase {
    Idle,
    ClearingScreen,
    Waiting,
    NpcAppears,
    /// 1-based dialogue line
    Dialogue(u8),
    MovingOff,
    FadeOut,
    FinalMessage,
    Complete,
}

impl EndingPhase {
    /// The phase that follows this one
    pub fn next(self) -> EndingPhase {
        match self {
            EndingPhase::Idle => EndingPhase::ClearingScreen,
            EndingPhase::ClearingScreen => EndingPhase::Waiting,
            EndingPhase::Waiting => EndingPhase::NpcAppears,
            EndingPhase::NpcAppears => EndingPhase::Dialogue(1),
            EndingPhase::Dialogue(n) if (n as usize) < DIALOGUE.len() => EndingPhase::Dialogue(n + 1),
            EndingPhase::Dialogue(_) => EndingPhase::MovingOff,
            EndingPhase::MovingOff => EndingPhase::FadeOut,
            EndingPhase::FadeOut => EndingPhase::FinalMessage,
            EndingPhase::FinalMessage | EndingPhase::Complete => EndingPhase::Complete,
        }
    }

    /// Position in the fixed sequence (Idle = 0)
    pub fn ordinal(self) -> u32 {
        match self {
            EndingPhase::Idle => 0,
            EndingPhase::ClearingScreen => 1,
            EndingPhase::Waiting => 2,
            EndingPhase::NpcAppears => 3,
            EndingPhase::Dialogue(n) => 3 + n as u32,
            EndingPhase::MovingOff => 4 + DIALOGUE.len() as u32,
            EndingPhase::FadeOut => 5 + DIALOGUE.len() as u32,
            EndingPhase::FinalMessage => 6 + DIALOGUE.len() as u32,
            EndingPhase::Complete => 7 + DIALOGUE.len() as u32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingDirector {
    pub phase: EndingPhase,
    pub phase_started_ms: f64,
    /// The NPC, once it has appeared
    pub npc: Option<Rect>,
    npc_start_x: f32,
    npc_target_x: f32,
    /// Full-screen overlay opacity (0-1)
    pub fade: f32,
}

impl Default for EndingDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl EndingDirector {
    pub fn new() -> Self {
        Self {
            phase: EndingPhase::Idle,
            phase_started_ms: 0.0,
            npc: None,
            npc_start_x: 0.0,
            npc_target_x: 0.0,
            fade: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != EndingPhase::Idle
    }

    /// Player input is ignored once the NPC is on its way
    pub fn locks_input(&self) -> bool {
        self.phase.ordinal() >= EndingPhase::NpcAppears.ordinal()
    }

    /// Current dialogue line, if in a dialogue phase
    pub fn dialogue_line(&self) -> Option<&'static str> {
        match self.phase {
            EndingPhase::Dialogue(n) => (n as usize)
                .checked_sub(1)
                .and_then(|i| DIALOGUE.get(i))
                .copied(),
            _ => None,
        }
    }

    /// Start the sequence (only from `Idle`)
    pub fn trigger(&mut self, now: f64, events: &mut Vec<GameEvent>) {
        if self.phase != EndingPhase::Idle {
            return;
        }
        log::info!("Ending sequence started");
        events.push(GameEvent::EndingStarted);
        self.advance(now, events);
    }

    /// Advance at most one phase. Returns true once the sequence is complete.
    pub fn update(
        &mut self,
        now: f64,
        scale: f32,
        screen_clear: bool,
        player: &mut Player,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let e = &tuning.ending;
        let elapsed = now - self.phase_started_ms;

        match self.phase {
            EndingPhase::Idle => {}
            EndingPhase::ClearingScreen => {
                if screen_clear {
                    self.advance(now, events);
                }
            }
            EndingPhase::Waiting => {
                if elapsed >= e.waiting_ms {
                    let world = &tuning.world;
                    self.npc_start_x = world.canvas_width;
                    self.npc_target_x = player.rect.right() + NPC_STOP_GAP;
                    self.npc = Some(Rect::standing_on(
                        self.npc_start_x,
                        world.ground_y,
                        e.npc_width,
                        e.npc_height,
                    ));
                    self.advance(now, events);
                }
            }
            EndingPhase::NpcAppears => {
                let t = (elapsed / e.npc_entry_ms).min(1.0) as f32;
                if let Some(npc) = self.npc.as_mut() {
                    npc.x = self.npc_start_x + (self.npc_target_x - self.npc_start_x) * t;
                }
                if elapsed >= e.npc_entry_ms {
                    self.advance(now, events);
                }
            }
            EndingPhase::Dialogue(_) => {
                if elapsed >= e.dialogue_ms {
                    self.advance(now, events);
                }
            }
            EndingPhase::MovingOff => {
                let dx = e.move_speed * scale;
                player.walk(dx);
                if let Some(npc) = self.npc.as_mut() {
                    npc.x += dx;
                }
                if elapsed >= e.moving_off_ms {
                    self.advance(now, events);
                }
            }
            EndingPhase::FadeOut => {
                self.fade = (elapsed / e.fade_ms).min(1.0) as f32;
                if elapsed >= e.fade_ms {
                    self.fade = 1.0;
                    self.advance(now, events);
                }
            }
            EndingPhase::FinalMessage => {
                if elapsed >= e.final_message_ms {
                    self.advance(now, events);
                }
            }
            EndingPhase::Complete => {}
        }

        self.phase == EndingPhase::Complete
    }

    fn advance(&mut self, now: f64, events: &mut Vec<GameEvent>) {
        let next = self.phase.next();
        if next == self.phase {
            return;
        }
        log::debug!("Ending phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.phase_started_ms = now;
        events.push(GameEvent::EndingPhaseChanged { phase: next });
    }
}
