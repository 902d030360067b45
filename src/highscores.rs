//! High score leaderboard
//!
//! The leaderboard is a fallible collaborator. Backends report errors; the
//! `Leaderboard` wrapper logs the first one and switches itself off so a
//! broken store never interrupts a match.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::sim::ShipVariant;

/// Maximum number of entries a backend keeps
pub const MAX_HIGH_SCORES: usize = 100;
/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("invalid player name {0:?}")]
    InvalidName(String),
    #[error("leaderboard io: {0}")]
    Io(#[from] std::io::Error),
    #[error("leaderboard json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("leaderboard unavailable")]
    Unavailable,
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub ship: ShipVariant,
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl LeaderboardEntry {
    /// Build an entry stamped with the current time. Names are trimmed and
    /// must be 1..=16 characters.
    pub fn new(name: &str, ship: ShipVariant, score: u64, level: u32) -> Result<Self, LeaderboardError> {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(LeaderboardError::InvalidName(name.to_string()));
        }
        Ok(Self {
            name: trimmed.to_string(),
            ship,
            score,
            level,
            timestamp: now_ms(),
        })
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// Sorted score table shared by the backends
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<LeaderboardEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert an entry, keeping the table sorted by score descending.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        // Ties rank below existing entries
        let rank = match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Storage behind the leaderboard
pub trait LeaderboardBackend {
    fn submit(&mut self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError>;
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

/// Process-local leaderboard
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    scores: HighScores,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardBackend for MemoryLeaderboard {
    fn submit(&mut self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        self.scores.insert(entry.clone());
        Ok(entry)
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.scores.top(limit))
    }
}

/// Leaderboard stored as a JSON file; re-read on every call
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<HighScores, LeaderboardError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HighScores::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl LeaderboardBackend for FileLeaderboard {
    fn submit(&mut self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        let mut scores = self.read()?;
        scores.insert(entry.clone());
        std::fs::write(&self.path, serde_json::to_string_pretty(&scores)?)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(entry)
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.read()?.top(limit))
    }
}

/// Leaderboard front that degrades to disabled on backend failure
pub struct Leaderboard {
    backend: Box<dyn LeaderboardBackend>,
    enabled: bool,
}

impl Leaderboard {
    pub fn new(backend: Box<dyn LeaderboardBackend>) -> Self {
        Self {
            backend,
            enabled: true,
        }
    }

    /// In-memory leaderboard
    pub fn memory() -> Self {
        Self::new(Box::new(MemoryLeaderboard::new()))
    }

    /// A leaderboard that is off from the start
    pub fn disabled() -> Self {
        Self {
            backend: Box::new(MemoryLeaderboard::new()),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Submit a score. None when the name is rejected or the board is off.
    pub fn submit_score(&mut self, name: &str, ship: ShipVariant, score: u64, level: u32) -> Option<LeaderboardEntry> {
        if !self.enabled {
            return None;
        }
        let entry = match LeaderboardEntry::new(name, ship, score, level) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("{err}");
                return None;
            }
        };
        match self.backend.submit(entry) {
            Ok(entry) => Some(entry),
            Err(err) => {
                self.disable(&err);
                None
            }
        }
    }

    /// Best scores first; empty when the board is off
    pub fn top_scores(&mut self, limit: usize) -> Vec<LeaderboardEntry> {
        if !self.enabled {
            return Vec::new();
        }
        match self.backend.top(limit) {
            Ok(entries) => entries,
            Err(err) => {
                self.disable(&err);
                Vec::new()
            }
        }
    }

    fn disable(&mut self, err: &LeaderboardError) {
        log::warn!("Leaderboard disabled: {err}");
        self.enabled = false;
    }
}
