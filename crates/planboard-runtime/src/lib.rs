#![forbid(unsafe_code)]

//! Planboard Runtime
//!
//! Board state, drag coordination, moves, undo, and persisted column layout.
//!
//! # Key Components
//!
//! - [`GestureCoordinator`] - Live drag state, long press, resize handles
//! - [`MoveEngine`] - Pure move/undo transformations plus side-effect fan-out
//! - [`LayoutStore`] - Versioned column preferences with frame-coalesced writes
//! - [`collision`] - Closest-center drop target resolution
//! - [`PreferenceStorage`] - Key-value persistence seam
//!
//! # Role in planboard
//! `planboard-runtime` sits between the input layer (`planboard-core`) and
//! the host. It turns gesture events into board mutations and layout
//! changes, and talks to the outside world only through the traits in
//! [`effects`] and [`storage`].
//!
//! # Logging
//! Every module logs through `tracing` on a fixed target:
//! `planboard.coordinator`, `planboard.move`, `planboard.layout`,
//! `planboard.storage` (and `planboard.gesture` from the core crate).

pub mod board;
pub mod collision;
pub mod coordinator;
pub mod effects;
pub mod frame_writes;
pub mod history;
pub mod layout_store;
pub mod move_engine;
pub mod scroll_lock;
pub mod storage;

pub use board::{BoardError, BoardState, Difficulty, WorkoutId, WorkoutItem};
pub use collision::{DropTarget, DropZone, closest_zone, resolve_target};
pub use coordinator::{
    CancelReason, CoordinatorConfig, CoordinatorEvent, CoordinatorPhase, CoordinatorStep,
    DragState, GestureCoordinator,
};
pub use effects::{
    AudioCue, BoardSink, Cue, Haptics, Noop, Notice, NoticeLevel, NoticeLog, Notifier,
    SideEffectError, SideEffects,
};
pub use frame_writes::{FrameWrite, FrameWrites, LayoutField};
pub use history::{HistoryConfig, MoveEvent, MoveHistory};
pub use layout_store::{ColumnPreferences, LayoutConfig, LayoutStore, LoadStatus, PREFERENCES_KEY};
pub use move_engine::{
    Clock, Committed, ManualClock, MoveEngine, MoveEngineConfig, MoveOutcome, NoOpReason,
    SystemClock, commit_move, revert_move,
};
pub use scroll_lock::{ScrollLock, ScrollToken};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage, StorageError, StorageResult};
