//! Player controller
//!
//! Gravity integration, the three-jump state machine and the two timed
//! abilities (shield, dash). Physics quantities are per 60 Hz frame and
//! scaled by `scale = dt / frame_ms`; ability timers count down in ms.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{GameEvent, Platform};
use crate::tuning::{PlayerTuning, Tuning};

/// Air jumps granted on landing (second and third jump)
pub const AIR_JUMPS: u8 = 2;

/// Vertical movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpState {
    /// Standing on the ground or a platform
    Grounded,
    /// Airborne without having jumped (walked off a platform)
    Falling,
    /// Airborne after a jump
    Jumped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Resting x; the dash offset is applied on top of it
    pub base_x: f32,
    /// Vertical velocity (pixels per frame, positive = down)
    pub vy: f32,
    pub jump_state: JumpState,
    /// Air jumps left before landing
    pub jumps_remaining: u8,
    /// Platform the player stands on, if any
    pub standing_on: Option<u32>,
    pub shield_ms_left: f64,
    pub shield_charges_used: u32,
    pub dash_ms_left: f64,
    pub dash_cooldown_ms_left: f64,
    /// Dash charges earned from collectibles and not yet spent
    pub dash_charges: u32,
    /// Current forward displacement from `base_x`
    pub dash_offset: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let p = &tuning.player;
        Self {
            rect: Rect::standing_on(p.x, tuning.world.ground_y, p.width, p.height),
            base_x: p.x,
            vy: 0.0,
            jump_state: JumpState::Grounded,
            jumps_remaining: AIR_JUMPS,
            standing_on: None,
            shield_ms_left: 0.0,
            shield_charges_used: 0,
            dash_ms_left: 0.0,
            dash_cooldown_ms_left: 0.0,
            dash_charges: 0,
            dash_offset: 0.0,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.jump_state == JumpState::Grounded
    }

    pub fn shield_active(&self) -> bool {
        self.shield_ms_left > 0.0
    }

    pub fn dash_active(&self) -> bool {
        self.dash_ms_left > 0.0
    }

    /// Shield or dash: collisions are ignored entirely
    pub fn is_invulnerable(&self) -> bool {
        self.shield_active() || self.dash_active()
    }

    /// Uniformly shrunk collision box
    pub fn hitbox(&self, shrink: f32) -> Rect {
        self.rect.shrink(shrink)
    }

    /// `floor(score / step) - used`, never below zero
    pub fn available_shield_charges(&self, score: u32, step: u32) -> u32 {
        (score / step.max(1)).saturating_sub(self.shield_charges_used)
    }

    /// Jump if the state allows it. Returns which jump this was (1-3).
    ///
    /// Grounded: leaves the ground with the full impulse and keeps both air
    /// jumps. Airborne: spends one air jump at a reduced impulse.
    pub fn request_jump(&mut self, tuning: &PlayerTuning) -> Option<u8> {
        let index = match self.jump_state {
            JumpState::Grounded => 0,
            JumpState::Falling | JumpState::Jumped => {
                if self.jumps_remaining == 0 {
                    return None;
                }
                let index = 1 + (AIR_JUMPS - self.jumps_remaining) as usize;
                self.jumps_remaining -= 1;
                index
            }
        };
        let multiplier = tuning.jump_multipliers.get(index).copied().unwrap_or(1.0);
        self.vy = -tuning.jump_impulse * multiplier;
        self.jump_state = JumpState::Jumped;
        self.standing_on = None;
        Some(index as u8 + 1)
    }

    /// Spend a shield charge if one is available and no shield is up
    pub fn request_shield(&mut self, score: u32, tuning: &PlayerTuning) -> bool {
        if self.shield_active() || self.available_shield_charges(score, tuning.shield_score_step) == 0 {
            return false;
        }
        self.shield_charges_used += 1;
        self.shield_ms_left = tuning.shield_duration_ms;
        true
    }

    /// Spend a dash charge unless dashing, cooling down or out of charges
    pub fn request_dash(&mut self, tuning: &PlayerTuning) -> bool {
        if self.dash_active() || self.dash_cooldown_ms_left > 0.0 || self.dash_charges == 0 {
            return false;
        }
        self.dash_charges -= 1;
        self.dash_ms_left = tuning.dash_duration_ms;
        true
    }

    /// Add one dash charge, up to `max`. Returns the new count.
    pub fn add_dash_charge(&mut self, max: u32) -> u32 {
        self.dash_charges = (self.dash_charges + 1).min(max);
        self.dash_charges
    }

    /// Shift the player horizontally (scripted movement)
    pub fn walk(&mut self, dx: f32) {
        self.base_x += dx;
        self.rect.x += dx;
    }

    /// Advance physics and ability timers by one step
    pub fn tick(
        &mut self,
        dt_ms: f64,
        scale: f32,
        tuning: &Tuning,
        platforms: &[Platform],
        events: &mut Vec<GameEvent>,
    ) {
        let p = &tuning.player;
        let ground_y = tuning.world.ground_y;

        // Walking off the edge of a platform
        if self.jump_state == JumpState::Grounded {
            if let Some(id) = self.standing_on {
                match platforms.iter().find(|pl| pl.id == id) {
                    Some(pl) if self.spans(&pl.rect) => self.rect.y = pl.rect.y - self.rect.h,
                    _ => {
                        self.standing_on = None;
                        self.jump_state = JumpState::Falling;
                    }
                }
            }
        }

        if self.jump_state != JumpState::Grounded {
            let prev_bottom = self.rect.bottom();
            self.vy += p.gravity * scale;
            self.rect.y += self.vy * scale;

            if self.vy >= 0.0 {
                if self.rect.bottom() >= ground_y {
                    self.land(ground_y, None);
                } else if let Some(pl) = platforms.iter().find(|pl| {
                    self.spans(&pl.rect) && prev_bottom <= pl.rect.y && self.rect.bottom() >= pl.rect.y
                }) {
                    self.land(pl.rect.y, Some(pl.id));
                }
            }
        }

        // Dash displacement eases out and back
        if self.dash_active() {
            self.dash_offset = (self.dash_offset + p.dash_approach_speed * scale).min(p.dash_offset);
        } else {
            self.dash_offset = (self.dash_offset - p.dash_return_speed * scale).max(0.0);
        }
        self.rect.x = self.base_x + self.dash_offset;

        if self.shield_active() {
            self.shield_ms_left -= dt_ms;
            if self.shield_ms_left <= 0.0 {
                self.shield_ms_left = 0.0;
                events.push(GameEvent::ShieldExpired);
            }
        }

        if self.dash_active() {
            self.dash_ms_left -= dt_ms;
            if self.dash_ms_left <= 0.0 {
                self.dash_ms_left = 0.0;
                self.dash_cooldown_ms_left = p.dash_cooldown_ms;
                events.push(GameEvent::DashEnded);
            }
        } else if self.dash_cooldown_ms_left > 0.0 {
            self.dash_cooldown_ms_left = (self.dash_cooldown_ms_left - dt_ms).max(0.0);
        }
    }

    fn land(&mut self, surface_y: f32, platform: Option<u32>) {
        self.rect.y = surface_y - self.rect.h;
        self.vy = 0.0;
        self.jump_state = JumpState::Grounded;
        self.jumps_remaining = AIR_JUMPS;
        self.standing_on = platform;
    }

    /// Horizontal overlap with a surface
    fn spans(&self, surface: &Rect) -> bool {
        self.rect.x < surface.right() && self.rect.right() > surface.x
    }
}
