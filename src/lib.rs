//! Alien Escape - a side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, spawning, collisions, bosses, ending)
//! - `tuning`: Data-driven game balance
//! - `audio`: Event-driven music and sound cue selection
//! - `leaderboard`: Local top-10 score table

pub mod audio;
pub mod error;
pub mod leaderboard;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use leaderboard::Leaderboard;
pub use sim::{FrameState, Simulation};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Default seed for the native runner
    pub const DEFAULT_SEED: u64 = 0x00a1_1e75;
    /// Frames the native runner simulates before giving up on a run
    pub const RUNNER_FRAME_CAP: u64 = 60 * 60 * 15;
    /// Leaderboard size
    pub const MAX_LEADERBOARD_ENTRIES: usize = 10;
    /// Leaderboard name length cap
    pub const MAX_NAME_LEN: usize = 20;
}
