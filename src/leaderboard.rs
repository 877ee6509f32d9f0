//! Local leaderboard
//!
//! Tracks the top 10 runs by score. Stored as JSON by the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEADERBOARD_ENTRIES, MAX_NAME_LEN};

/// Name used when the submitted one has no usable characters
pub const ANONYMOUS: &str = "ANONYMOUS";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Sorted by score, highest first
    pub entries: Vec<LeaderboardEntry>,
}

/// Uppercase, keep `[A-Z0-9 ]` only, trim and cap the length
pub fn sanitize_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_NAME_LEN)
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run. Returns the rank achieved (1-indexed) or None.
    pub fn add_score(&mut self, name: &str, score: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        let entry = LeaderboardEntry {
            name: sanitize_name(name),
            score,
            timestamp,
        };
        log::info!("{} placed #{} with {}", entry.name, rank, score);
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Some(rank)
    }

    /// Best score recorded under `name` (compared after sanitizing)
    pub fn personal_best(&self, name: &str) -> Option<u32> {
        let name = sanitize_name(name);
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.score)
            .max()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut board: Leaderboard = serde_json::from_str(json)?;
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Ok(board)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from `path`, starting fresh if it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(board) => {
                    log::info!("Loaded {} leaderboard entries", board.entries.len());
                    board
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt leaderboard {}: {e}", path.display());
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No leaderboard found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}
