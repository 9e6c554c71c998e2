#![forbid(unsafe_code)]

//! Board mutation and undo.
//!
//! [`commit_move`] and [`revert_move`] are pure: they take a board and return
//! a new one. [`MoveEngine`] owns the current board, the bounded
//! [`MoveHistory`], a [`Clock`] for item stamps, and the [`SideEffects`]
//! fan-out.
//!
//! # Semantics
//!
//! - A move removes the item from the source list and appends it to the
//!   **tail** of the target list. The original index is not recorded, so undo
//!   also appends to the tail of the source list.
//! - Dropping on the source day, or naming an item the source does not hold,
//!   is a no-op: no new board, no history entry, no side effect.
//! - Undo pops one entry and pushes nothing. An empty stack is a silent
//!   no-op. An entry whose item has since left the target day is consumed
//!   and leaves the board unchanged.
//!
//! # Invariants
//!
//! 1. `commit_move` preserves the total item count and moves exactly one item.
//! 2. Days other than source and target are untouched by a move or undo.
//! 3. `has_undo() == (undo_depth() > 0)`.

use std::fmt;

use planboard_core::Day;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::board::{BoardState, WorkoutId};
use crate::effects::{Cue, Notice, SideEffects};
use crate::history::{HistoryConfig, MoveEvent, MoveHistory};

// ---------------------------------------------------------------------------
// Pure transformations
// ---------------------------------------------------------------------------

/// Why a move request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoOpReason {
    /// Source and target are the same day.
    SameDay,
    /// The item is not in the source day's list.
    NotInSource,
}

/// Result of [`commit_move`].
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Moved { board: BoardState, event: MoveEvent },
    NoOp(NoOpReason),
}

/// Move `item_id` from `source` to the tail of `target`, stamping `now_ms`.
#[must_use]
pub fn commit_move(
    board: &BoardState,
    source: Day,
    target: Day,
    item_id: &WorkoutId,
    now_ms: u64,
) -> MoveOutcome {
    if source == target {
        return MoveOutcome::NoOp(NoOpReason::SameDay);
    }
    let Some((mut next, item)) = board.removing(source, item_id) else {
        return MoveOutcome::NoOp(NoOpReason::NotInSource);
    };
    let moved = item.touched(now_ms);
    next.append(target, moved.clone());
    MoveOutcome::Moved {
        board: next,
        event: MoveEvent {
            source_day: source,
            target_day: target,
            item: moved,
            timestamp_ms: now_ms,
        },
    }
}

/// Invert `event`: take its item out of the target day and append it to the
/// source day, stamped `now_ms`. `None` if the item is no longer in the
/// target day.
#[must_use]
pub fn revert_move(board: &BoardState, event: &MoveEvent, now_ms: u64) -> Option<BoardState> {
    let (mut next, item) = board.removing(event.target_day, &event.item.id)?;
    next.append(event.source_day, item.touched(now_ms));
    Some(next)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Wall-clock source for item stamps.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// [`Clock`] that returns a settable value and advances by a fixed step on
/// every read. Used by tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::cell::Cell<u64>,
    step: u64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: std::cell::Cell::new(start_ms),
            step: 0,
        }
    }

    #[must_use]
    pub fn with_step(mut self, step_ms: u64) -> Self {
        self.step = step_ms;
        self
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step));
        now
    }
}

// ---------------------------------------------------------------------------
// MoveEngine
// ---------------------------------------------------------------------------

/// Configuration for [`MoveEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveEngineConfig {
    /// Maximum number of undoable moves (default: 50).
    pub undo_limit: usize,
}

impl Default for MoveEngineConfig {
    fn default() -> Self {
        Self {
            undo_limit: HistoryConfig::default().max_depth,
        }
    }
}

/// What [`MoveEngine::commit_move`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Moved(MoveEvent),
    NoOp(NoOpReason),
}

impl Committed {
    #[must_use]
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Owner of the live board and its undo history.
pub struct MoveEngine {
    board: BoardState,
    history: MoveHistory,
    clock: Box<dyn Clock>,
    effects: SideEffects,
}

impl fmt::Debug for MoveEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveEngine")
            .field("items", &self.board.len())
            .field("undo_depth", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl MoveEngine {
    #[must_use]
    pub fn new(board: BoardState, config: MoveEngineConfig) -> Self {
        Self {
            board,
            history: MoveHistory::new(HistoryConfig::new(config.undo_limit)),
            clock: Box::new(SystemClock),
            effects: SideEffects::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: SideEffects) -> Self {
        self.effects = effects;
        self
    }

    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    #[must_use]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Side channels, for collaborators that share them (the coordinator's
    /// haptics and drop notices).
    pub fn effects_mut(&mut self) -> &mut SideEffects {
        &mut self.effects
    }

    /// Replace the board wholesale (external reload). History referring to
    /// the old board is discarded.
    pub fn load_board(&mut self, board: BoardState) {
        self.board = board;
        self.history.clear();
    }

    /// Move `item_id` from `source` to the tail of `target`.
    pub fn commit_move(&mut self, source: Day, target: Day, item_id: &WorkoutId) -> Committed {
        let now_ms = self.clock.now_ms();
        match commit_move(&self.board, source, target, item_id, now_ms) {
            MoveOutcome::NoOp(reason) => {
                tracing::debug!(
                    target: "planboard.move",
                    item = %item_id,
                    %source,
                    %target,
                    ?reason,
                    "move ignored"
                );
                Committed::NoOp(reason)
            }
            MoveOutcome::Moved { board, event } => {
                self.board = board;
                let evicted = self.history.push(event.clone());
                tracing::info!(
                    target: "planboard.move",
                    item = %item_id,
                    %source,
                    %target,
                    undo_depth = self.history.len(),
                    evicted,
                    "move committed"
                );
                self.effects.play(Cue::Drop);
                self.effects.notify(Notice::Moved {
                    title: event.item.title.clone(),
                    from: source,
                    to: target,
                });
                self.effects.board_changed(&self.board);
                Committed::Moved(event)
            }
        }
    }

    /// Revert the most recent move. Returns the consumed entry if the board
    /// changed.
    pub fn undo_last_move(&mut self) -> Option<MoveEvent> {
        let event = self.history.pop()?;
        let now_ms = self.clock.now_ms();
        let Some(board) = revert_move(&self.board, &event, now_ms) else {
            tracing::warn!(
                target: "planboard.move",
                item = %event.item.id,
                day = %event.target_day,
                "undo entry is stale, item no longer in target day"
            );
            return None;
        };
        self.board = board;
        tracing::info!(
            target: "planboard.move",
            item = %event.item.id,
            day = %event.source_day,
            undo_depth = self.history.len(),
            "move undone"
        );
        self.effects.play(Cue::Undo);
        self.effects.notify(Notice::Undone {
            title: event.item.title.clone(),
            back_to: event.source_day,
        });
        self.effects.board_changed(&self.board);
        Some(event)
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Label of the move [`undo_last_move`](Self::undo_last_move) would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.history.peek().map(MoveEvent::description)
    }
}
