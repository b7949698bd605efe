//! Persistent player progression.
//!
//! The engine only reports points and tool names.  [`Progression`] is the
//! collaborator that turns those reports into a level, a tool collection,
//! achievements and a streak, and keeps them on disk between runs.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog;
use crate::events::EngineObserver;

/// Cumulative points needed per progression level.
pub const LEVEL_SPAN: u64 = 1000;

/// File name under `$HOME` used by the terminal game.
pub const PROGRESS_FILE: &str = ".recovery_arcade_progress.json";

pub const FIRST_VICTORY: &str = "First Victory";
pub const FIRST_TOOL: &str = "First Tool";
pub const FULL_TOOLKIT: &str = "Full Toolkit";
pub const RISING_STAR: &str = "Rising Star";
pub const THREE_IN_A_ROW: &str = "Three in a Row";

const RISING_STAR_LEVEL: u32 = 5;
const THREE_IN_A_ROW_STREAK: u32 = 3;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub level: u32,
    pub total_score: u64,
    /// Catalog names of every tool ever collected.
    pub tools: BTreeSet<String>,
    pub achievements: BTreeSet<String>,
    /// Sessions played to the end in a row.
    pub streak: u32,
    pub sessions_completed: u32,
    pub best_session_bonus: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            total_score: 0,
            tools: BTreeSet::new(),
            achievements: BTreeSet::new(),
            streak: 0,
            sessions_completed: 0,
            best_session_bonus: 0,
        }
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$HOME/.recovery_arcade_progress.json`, or the working directory when
    /// `HOME` is unset.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(PROGRESS_FILE)
    }

    pub fn add_points(&mut self, points: u32) {
        self.total_score = self.total_score.saturating_add(points as u64);
        let level = (self.total_score / LEVEL_SPAN).min(u32::MAX as u64 - 1) as u32 + 1;
        if level > self.level {
            info!(level, total_score = self.total_score, "progression level up");
        }
        self.level = level;
        if self.level >= RISING_STAR_LEVEL {
            self.unlock(RISING_STAR);
        }
    }

    /// Add a tool to the collection.  Returns `false` if it was already owned.
    pub fn collect_tool(&mut self, name: &str) -> bool {
        if !self.tools.insert(name.to_string()) {
            return false;
        }
        self.unlock(FIRST_TOOL);
        if self.has_full_toolkit() {
            self.unlock(FULL_TOOLKIT);
        }
        true
    }

    pub fn has_full_toolkit(&self) -> bool {
        catalog::BENEFITS
            .iter()
            .all(|entry| self.tools.contains(entry.name))
    }

    /// A session ran to the end.
    pub fn record_session(&mut self, bonus: u32) {
        self.sessions_completed += 1;
        self.streak += 1;
        self.best_session_bonus = self.best_session_bonus.max(bonus);
        self.unlock(FIRST_VICTORY);
        if self.streak >= THREE_IN_A_ROW_STREAK {
            self.unlock(THREE_IN_A_ROW);
        }
    }

    /// A session was quit or restarted before the clock ran out.
    pub fn record_abandoned(&mut self) {
        if self.streak > 0 {
            debug!(streak = self.streak, "streak broken");
        }
        self.streak = 0;
    }

    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.contains(name)
    }

    fn unlock(&mut self, name: &str) {
        if self.achievements.insert(name.to_string()) {
            info!(achievement = name, "achievement unlocked");
        }
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Load from `path`.  A missing file is a fresh start.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgressError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No progression at {:?}, starting fresh", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProgressError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved progression to {:?}", path);
        Ok(())
    }
}

impl EngineObserver for Progression {
    fn on_challenge_complete(&mut self, _label: &str, points: u32) {
        self.add_points(points);
    }

    fn on_tool_collect(&mut self, name: &str) {
        self.collect_tool(name);
    }

    fn on_session_complete(&mut self, _label: &str, bonus: u32, _difficulty_level: u32) {
        self.record_session(bonus);
    }
}
