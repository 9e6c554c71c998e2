#![forbid(unsafe_code)]

//! Bounded undo stack of committed moves.
//!
//! # Invariants
//!
//! 1. `len() <= config.max_depth` after any operation.
//! 2. When full, pushing evicts the oldest entry first.
//! 3. There is no redo stack: undo consumes an entry and pushes nothing.
//!
//! ```text
//! push(m4) with max_depth = 3
//! ┌──────────────────────────────┐
//! │ before: [m1, m2, m3]         │
//! │ after:  [m2, m3, m4]         │  m1 evicted
//! └──────────────────────────────┘
//! ```

use std::collections::VecDeque;

use planboard_core::Day;
use serde::{Deserialize, Serialize};

use crate::board::WorkoutItem;

/// One committed move, as recorded for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub source_day: Day,
    pub target_day: Day,
    /// Snapshot of the item after the move (carries the fresh stamp).
    pub item: WorkoutItem,
    /// Commit time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl MoveEvent {
    /// Human-readable label, e.g. `Move "Intervals" from Monday to Tuesday`.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "Move \"{}\" from {} to {}",
            self.item.title, self.source_day, self.target_day
        )
    }
}

/// Configuration for [`MoveHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable moves kept (default: 50).
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// No practical limit (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Undo stack, newest at the back.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    entries: VecDeque<MoveEvent>,
    config: HistoryConfig,
}

impl MoveHistory {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record a move. Returns how many old entries were evicted.
    pub fn push(&mut self, event: MoveEvent) -> usize {
        if self.config.max_depth == 0 {
            return 1;
        }
        self.entries.push_back(event);
        self.enforce_depth()
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Option<MoveEvent> {
        self.entries.pop_back()
    }

    /// Newest entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&MoveEvent> {
        self.entries.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MoveEvent> + '_ {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change the depth limit, evicting immediately if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) -> usize {
        self.config.max_depth = max_depth;
        self.enforce_depth()
    }

    fn enforce_depth(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.config.max_depth);
        self.entries.drain(..excess);
        excess
    }
}
