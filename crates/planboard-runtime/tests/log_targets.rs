#![forbid(unsafe_code)]

//! Logging policy checks.
//!
//! Side-effect and persistence failures must be reported as WARN events on
//! the subsystem's stable target, and must not abort the operation that
//! triggered them.
//!
//! Run:
//!   cargo test -p planboard-runtime --test log_targets

use std::sync::{Arc, Mutex};

use planboard_core::Day;
use planboard_runtime::{
    BoardSink, BoardState, LayoutConfig, LayoutStore, LoadStatus, ManualClock, MemoryStorage,
    MoveEngine, MoveEngineConfig, PREFERENCES_KEY, SideEffectError, SideEffects, WorkoutItem,
};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
}

/// Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_owned(),
            message: visitor.0,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    (result, events)
}

fn warnings_on<'a>(events: &'a [CapturedEvent], target: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN && e.target == target)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

struct OfflineSink;

impl BoardSink for OfflineSink {
    fn board_changed(&mut self, _board: &BoardState) -> Result<(), SideEffectError> {
        Err(SideEffectError::Sink("offline".into()))
    }
}

#[test]
fn sink_failure_warns_on_move_target() {
    let board = BoardState::new().with_item(Day::Monday, WorkoutItem::new("w1", "Run"));
    let (engine, events) = capture(|| {
        let mut engine = MoveEngine::new(board, MoveEngineConfig::default())
            .with_clock(ManualClock::new(0))
            .with_effects(SideEffects::default().with_sink(OfflineSink));
        engine.commit_move(Day::Monday, Day::Friday, &"w1".into());
        engine
    });

    assert!(engine.board().contains(Day::Friday, &"w1".into()));
    let warns = warnings_on(&events, "planboard.move");
    assert_eq!(warns.len(), 1, "events: {events:#?}");
    assert!(warns[0].message.contains("board sink"));
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::INFO && e.message.contains("move committed"))
    );
}

#[test]
fn version_mismatch_warns_on_layout_target() {
    let storage = MemoryStorage::with_entry(PREFERENCES_KEY, r#"{"version": 99}"#);
    let (store, events) = capture(|| LayoutStore::load(storage, LayoutConfig::default()));

    assert_eq!(store.load_status(), LoadStatus::VersionMismatch { stored: 99 });
    let warns = warnings_on(&events, "planboard.layout");
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("version mismatch"));
}

#[test]
fn empty_undo_is_silent() {
    let (_, events) = capture(|| {
        let mut engine = MoveEngine::new(BoardState::new(), MoveEngineConfig::default());
        engine.undo_last_move()
    });
    assert!(warnings_on(&events, "planboard.move").is_empty());
}
