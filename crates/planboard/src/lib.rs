#![forbid(unsafe_code)]

//! Weekly planning board public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! common types from the internal crates, wires them into one [`Planner`]
//! session, and offers a prelude for day-to-day usage.

pub mod config;
pub mod error;
pub mod planner;

// --- Core re-exports -------------------------------------------------------

pub use planboard_core::{
    Day, DayMap, HeadlessHost, InputEvent, InputHost, ListenerKind, MouseButton, MouseEvent,
    MouseEventKind, Point, PointerSource, Rect, TouchEvent, TouchEventKind,
};

// --- Runtime re-exports ----------------------------------------------------

pub use planboard_runtime::{
    AudioCue, BoardSink, BoardState, CancelReason, ColumnPreferences, CoordinatorEvent,
    CoordinatorPhase, Cue, Difficulty, DragState, DropZone, FileStorage, Haptics, LoadStatus,
    MemoryStorage, MoveEvent, Notice, NoticeLog, Notifier, PreferenceStorage, SideEffects,
    WorkoutId, WorkoutItem,
};

// --- Facade ----------------------------------------------------------------

pub use config::{ConfigError, GestureSection, PlannerConfig};
pub use error::{Error, Result};
pub use planner::Planner;

pub mod prelude {
    pub use crate::{
        BoardState, CoordinatorEvent, Day, Error, InputEvent, Notice, Planner, PlannerConfig,
        Result, WorkoutId, WorkoutItem,
    };

    pub use crate::{core, runtime};
}

pub use planboard_core as core;
pub use planboard_runtime as runtime;
