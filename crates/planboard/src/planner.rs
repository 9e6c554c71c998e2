#![forbid(unsafe_code)]

//! One weekly board session.
//!
//! [`Planner`] owns the coordinator, the move engine, the layout store and
//! the input host, and routes between them: a `Dropped` event from the
//! coordinator becomes a committed move, a cancelled drop becomes a notice,
//! long-press haptics go through the engine's side channels.
//!
//! The planner is driven entirely by its caller:
//!
//! 1. Forward pointer events: [`press_item`](Planner::press_item),
//!    [`press_resize_handle`](Planner::press_resize_handle), then
//!    [`handle_input`](Planner::handle_input) for everything routed through
//!    the acquired listeners.
//! 2. Call [`tick`](Planner::tick) no later than
//!    [`next_deadline`](Planner::next_deadline).
//! 3. Call [`flush_frame`](Planner::flush_frame) once per animation frame.
//!
//! # Invariants
//!
//! - The board only changes through [`MoveEngine`]; the coordinator never
//!   touches it.
//! - [`unmount`](Planner::unmount) leaves no listeners attached and page
//!   scrolling enabled.

use planboard_core::{Day, InputEvent, InputHost};
use planboard_runtime::{
    BoardState, CancelReason, Clock, ColumnPreferences, Committed, CoordinatorEvent,
    CoordinatorPhase, CoordinatorStep, DragState, DropZone, GestureCoordinator, LayoutStore,
    MoveEngine, MoveEvent, Notice, PreferenceStorage, SideEffects, StorageError, WorkoutId,
};
use web_time::Instant;

use crate::config::PlannerConfig;
use crate::error::Result;

/// A board session bound to one input host.
#[derive(Debug)]
pub struct Planner<H: InputHost> {
    coordinator: GestureCoordinator,
    engine: MoveEngine,
    layout: LayoutStore,
    host: H,
}

impl<H: InputHost> Planner<H> {
    /// Validate `config` and `board`, then load column preferences from
    /// `storage`. Preference problems fall back to defaults; only invalid
    /// configuration or a board holding the same workout twice fail.
    pub fn new(
        config: PlannerConfig,
        board: BoardState,
        storage: impl PreferenceStorage + 'static,
        host: H,
    ) -> Result<Self> {
        let config = config.validated()?;
        board.validate()?;
        let coordinator =
            GestureCoordinator::new(config.gesture.to_gesture_config(), config.coordinator)?;
        let layout = LayoutStore::load(storage, config.layout);
        tracing::debug!(
            target: "planboard.coordinator",
            workouts = board.len(),
            layout = ?layout.load_status(),
            "planner created"
        );
        Ok(Self {
            coordinator,
            engine: MoveEngine::new(board, config.move_engine),
            layout,
            host,
        })
    }

    #[must_use]
    pub fn with_effects(mut self, effects: SideEffects) -> Self {
        self.engine = self.engine.with_effects(effects);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    // --- Input ---

    /// Press on a workout card. Returns `false` if the press was refused
    /// (another gesture in flight, unknown card, wrong button).
    pub fn press_item(&mut self, item: WorkoutId, day: Day, event: &InputEvent, now: Instant) -> bool {
        if !self.engine.board().contains(day, &item) {
            tracing::debug!(target: "planboard.coordinator", item = %item, %day, "press on unknown card");
            return false;
        }
        self.coordinator
            .press_item(item, day, event, &mut self.host, now)
    }

    pub fn press_resize_handle(&mut self, day: Day, event: &InputEvent) -> bool {
        self.coordinator
            .press_resize_handle(day, event, &mut self.host, &self.layout)
    }

    /// Feed an event delivered through the gesture's listeners.
    pub fn handle_input(&mut self, event: &InputEvent, now: Instant) -> CoordinatorStep {
        let step = self
            .coordinator
            .handle_input(event, &mut self.host, &mut self.layout, now);
        self.apply(&step.events);
        step
    }

    /// Advance long-press and throttled-move timers.
    pub fn tick(&mut self, now: Instant) -> Vec<CoordinatorEvent> {
        let events = self.coordinator.tick(
            now,
            &mut self.host,
            &mut self.layout,
            self.engine.effects_mut(),
        );
        self.apply(&events);
        events
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.coordinator.next_deadline()
    }

    /// Apply this frame's coalesced layout writes. Returns how many fields
    /// changed.
    pub fn flush_frame(&mut self) -> usize {
        self.layout.flush_frame()
    }

    /// The host finished animating the last drop.
    pub fn finish_drop_animation(&mut self) {
        self.coordinator.finish_drop_animation();
    }

    /// Replace the column hit areas (after layout or scroll).
    pub fn set_drop_zones(&mut self, zones: Vec<DropZone>) {
        self.coordinator.set_drop_zones(zones);
    }

    // --- Layout ---

    pub fn observe_column_height(&mut self, day: Day, height: f32) -> bool {
        self.coordinator
            .observe_column_height(day, height, &mut self.layout)
    }

    pub fn toggle_collapsed(&mut self, day: Day) -> bool {
        self.coordinator.toggle_collapsed(day, &mut self.layout)
    }

    /// Reorder columns. Rejected unless `order` names every day once.
    pub fn set_column_order(&mut self, order: Vec<Day>) -> bool {
        self.layout.set_order(order)
    }

    /// Returns the zoom actually applied after clamping.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.layout.set_zoom(zoom)
    }

    pub fn reset_layout(&mut self) {
        self.layout.reset();
    }

    /// Current preferences as the JSON blob that would be persisted.
    pub fn preferences_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self.layout.preferences())
            .map_err(|err| StorageError::from(err).into())
    }

    // --- Board ---

    /// Replace the board from an external source. Undo history is dropped.
    pub fn reload_board(&mut self, board: BoardState) -> Result<()> {
        board.validate()?;
        self.engine.load_board(board);
        Ok(())
    }

    /// Revert the most recent move.
    pub fn undo(&mut self) -> Option<MoveEvent> {
        self.engine.undo_last_move()
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        self.engine.has_undo()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.engine.undo_depth()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.engine.next_undo_description()
    }

    // --- Lifecycle ---

    /// Abort the gesture in flight (Escape, focus loss, visibility change).
    pub fn cancel(&mut self) -> Vec<CoordinatorEvent> {
        let events = self.coordinator.cancel(&mut self.host, &mut self.layout);
        self.apply(&events);
        events
    }

    /// Tear down: release every listener and scroll lock and drop pending
    /// frame writes. A resize in progress is written back to its start
    /// width. Safe to call more than once.
    pub fn unmount(&mut self) -> Vec<CoordinatorEvent> {
        self.coordinator.unmount(&mut self.host, &mut self.layout)
    }

    // --- Accessors ---

    #[must_use]
    pub fn board(&self) -> &BoardState {
        self.engine.board()
    }

    #[must_use]
    pub fn preferences(&self) -> &ColumnPreferences {
        self.layout.preferences()
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.coordinator.drag_state()
    }

    #[must_use]
    pub fn phase(&self) -> CoordinatorPhase {
        self.coordinator.phase()
    }

    #[must_use]
    pub fn scroll_lock_depth(&self) -> usize {
        self.coordinator.scroll_lock_depth()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutStore {
        &self.layout
    }

    #[must_use]
    pub fn engine(&self) -> &MoveEngine {
        &self.engine
    }

    pub fn effects_mut(&mut self) -> &mut SideEffects {
        self.engine.effects_mut()
    }

    /// Consume the planner, returning the host.
    pub fn into_host(mut self) -> H {
        self.coordinator.unmount(&mut self.host, &mut self.layout);
        self.host
    }

    fn apply(&mut self, events: &[CoordinatorEvent]) {
        for event in events {
            match event {
                CoordinatorEvent::Dropped {
                    item,
                    source,
                    target,
                } => {
                    if let Committed::NoOp(reason) = self.engine.commit_move(*source, *target, item)
                    {
                        tracing::debug!(
                            target: "planboard.move",
                            item = %item,
                            ?reason,
                            "drop did not move anything"
                        );
                        self.engine.effects_mut().notify(Notice::DropCancelled);
                    }
                }
                CoordinatorEvent::DropCancelled { reason, .. } => {
                    let notice = match reason {
                        CancelReason::Rejected(day) => Notice::DropRejected { day: *day },
                        CancelReason::NoTarget | CancelReason::SameDay | CancelReason::Aborted => {
                            Notice::DropCancelled
                        }
                    };
                    self.engine.effects_mut().notify(notice);
                }
                _ => {}
            }
        }
    }
}
