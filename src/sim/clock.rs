//! Simulation clock
//!
//! Converts the caller's per-frame timestamps into fixed simulation steps
//! and exposes the input surface. Gameplay timers only ever see the
//! simulation clock, so a run is reproducible from its seed and the
//! sequence of inputs per step.

use super::frame::FrameState;
use super::state::GameState;
use super::tick::{TickInput, tick};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Longest real-time gap a single frame may account for (ms)
pub const MAX_FRAME_DELTA_MS: f64 = 250.0;

#[derive(Debug)]
pub struct Simulation {
    state: GameState,
    input: TickInput,
    accumulator: f64,
    last_now: Option<f64>,
}

impl Simulation {
    /// Validate `tuning` and start a run
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        log::info!("New run with seed {seed}");
        Ok(Self {
            state: GameState::new(seed, tuning),
            input: TickInput::default(),
            accumulator: 0.0,
            last_now: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Let the autopilot play (demo mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    pub fn on_jump_requested(&mut self) {
        self.input.jump = true;
    }

    pub fn on_shield_requested(&mut self) {
        self.input.shield = true;
    }

    pub fn on_dash_requested(&mut self) {
        self.input.dash = true;
    }

    /// Start a new run with the same seed and tuning
    pub fn reset(&mut self) {
        self.reset_with_seed(self.state.seed);
    }

    /// Start a new run with a different seed
    pub fn reset_with_seed(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        let autopilot = self.input.autopilot;
        self.state = GameState::new(seed, tuning);
        self.input = TickInput {
            autopilot,
            ..Default::default()
        };
        self.accumulator = 0.0;
        self.last_now = None;
        log::info!("Run reset with seed {seed}");
    }

    /// Advance to `now_ms` and snapshot the result
    pub fn tick(&mut self, now_ms: f64) -> FrameState {
        let dt = match self.last_now {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_now = Some(now_ms);

        if self.state.is_over() {
            return FrameState::capture(&self.state, Vec::new());
        }

        let step = self.state.tuning.world.frame_ms;
        let max_substeps = self.state.tuning.world.max_substeps;
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= step && substeps < max_substeps {
            tick(&mut self.state, &self.input, step);
            self.accumulator -= step;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.jump = false;
            self.input.shield = false;
            self.input.dash = false;

            events.append(&mut self.state.events);
            if self.state.is_over() {
                self.accumulator = 0.0;
                break;
            }
        }
        if substeps == max_substeps && self.accumulator >= step {
            log::debug!("Dropping {:.1} ms of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        FrameState::capture(&self.state, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::JumpState;
    use crate::sim::state::GameEvent;

    const FRAME: f64 = 1000.0 / 60.0;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.ground_boss.milestones.clear();
        tuning.flying_boss.milestones.clear();
        tuning
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.player.shield_duration_ms = -1.0;
        assert!(Simulation::new(1, tuning).is_err());
    }

    #[test]
    fn test_first_frame_runs_no_steps() {
        let mut sim = Simulation::new(1, quiet_tuning()).unwrap();
        let frame = sim.tick(5_000.0);
        assert_eq!(frame.time_ms, 0.0);
        let frame = sim.tick(5_000.0 + FRAME * 3.0 + 1.0);
        assert!((frame.time_ms - FRAME * 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut sim = Simulation::new(1, quiet_tuning()).unwrap();
        sim.tick(0.0);
        let frame = sim.tick(60_000.0);
        let max = FRAME * sim.state().tuning.world.max_substeps as f64;
        assert!(frame.time_ms <= max + 1e-6);
        assert!(frame.time_ms > 0.0);
    }

    #[test]
    fn test_jump_consumed_by_one_step() {
        let mut sim = Simulation::new(1, quiet_tuning()).unwrap();
        sim.tick(0.0);
        sim.on_jump_requested();
        let frame = sim.tick(FRAME * 4.0 + 1.0);
        let jumps = frame
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Jumped { .. }))
            .count();
        assert_eq!(jumps, 1);
        assert_ne!(frame.player.jump_state, JumpState::Grounded);
    }

    #[test]
    fn test_queued_input_waits_for_a_step() {
        let mut sim = Simulation::new(1, quiet_tuning()).unwrap();
        sim.tick(0.0);
        sim.on_jump_requested();
        let frame = sim.tick(1.0);
        assert!(frame.events.is_empty());
        let frame = sim.tick(FRAME + 2.0);
        assert!(frame.events.contains(&GameEvent::Jumped { count: 1 }));
    }

    #[test]
    fn test_frozen_after_run_over() {
        let mut sim = Simulation::new(3, quiet_tuning()).unwrap();
        let mut now = 0.0;
        let mut ended = None;
        for _ in 0..20_000 {
            now += FRAME;
            let frame = sim.tick(now);
            if frame.run_over {
                ended = Some(frame);
                break;
            }
        }
        let ended = ended.expect("idle run never ended");
        assert!(ended.events.iter().any(|e| matches!(e, GameEvent::RunEnded { .. })));

        let later = sim.tick(now + 1_000.0);
        assert!(later.run_over);
        assert!(later.events.is_empty());
        assert_eq!(later.time_ms, ended.time_ms);
        assert_eq!(later.score, ended.score);
    }

    #[test]
    fn test_reset_replays_same_run() {
        let mut sim = Simulation::new(11, Tuning::default()).unwrap();
        sim.set_autopilot(true);
        let mut first = Vec::new();
        for i in 0..600 {
            first.push(serde_json::to_string(&sim.tick(i as f64 * FRAME)).unwrap());
        }
        sim.reset();
        for (i, expected) in first.iter().enumerate() {
            let frame = serde_json::to_string(&sim.tick(i as f64 * FRAME)).unwrap();
            assert_eq!(&frame, expected, "diverged at frame {i}");
        }
    }
}
