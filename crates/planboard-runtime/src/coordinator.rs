#![forbid(unsafe_code)]

//! Gesture coordination for the board: card drags, long press, resize
//! handles, column height and collapse.
//!
//! [`GestureCoordinator`] owns the live [`DragState`]. The host feeds it
//! presses, routed pointer events and timer ticks; it answers with
//! [`CoordinatorEvent`]s. It never mutates the board itself: a valid drop is
//! reported as [`CoordinatorEvent::Dropped`] and the caller commits it
//! through the move engine.
//!
//! # State Machine
//!
//! ```text
//!                press_item (mouse)          threshold crossed
//!   Idle ───────────────────────► Pressed ───────────────────────► Dragging
//!    │  press_item (touch)          │ │  tick: long press elapsed      │
//!    │  arms long-press timer ──────┘ │  while stationary ─────────────┤
//!    │                                │ moved past threshold first:    │
//!    │                                │ timer disarmed, never a drag   │
//!    │ press_resize_handle            ▼                                ▼
//!    └──────────────────────► Resizing        release / cancel / unmount → Idle
//! ```
//!
//! # Invariants
//!
//! 1. Every exit to `Idle` (drop, tap, cancel, touch-cancel, unmount) runs the
//!    same cleanup: listeners released, throttled move dropped, scroll lock
//!    token returned, long-press timer disarmed.
//! 2. The scroll lock is held iff the phase is `Dragging` or an active resize.
//! 3. The drop target reported with `Dropped` is resolved from the release
//!    coordinate, not from the last throttled move.
//! 4. `drag_distance` never decreases within a gesture.

use std::time::Duration;

use planboard_core::{
    Activation, Day, GestureConfig, GestureConfigError, GestureEvent, GestureInput, InputEvent,
    InputHost, Point, PointerSource,
};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::board::WorkoutId;
use crate::collision::{DropTarget, DropZone, resolve_target};
use crate::effects::SideEffects;
use crate::layout_store::LayoutStore;
use crate::scroll_lock::{ScrollLock, ScrollToken};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Coordinator timing and tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Touch hold time before a card lifts (default: 500ms).
    pub long_press_ms: u64,
    /// Largest displacement (px) still counted as holding still when the
    /// long-press timer fires (default: 5.0).
    pub stationary_tolerance: f32,
    /// Drag start threshold for resize handles (default: 4.0).
    pub resize_threshold: f32,
    /// Haptic pulse length on long-press lift (default: 50ms).
    pub haptic_pulse_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            stationary_tolerance: 5.0,
            resize_threshold: 4.0,
            haptic_pulse_ms: 50,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    #[must_use]
    pub fn haptic_pulse(&self) -> Duration {
        Duration::from_millis(self.haptic_pulse_ms)
    }

    /// Problems with the values, empty if usable.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.long_press_ms == 0 {
            problems.push("long_press_ms must be non-zero".to_owned());
        }
        if !self.stationary_tolerance.is_finite() || self.stationary_tolerance < 0.0 {
            problems.push(format!(
                "stationary_tolerance must be finite and non-negative, got {}",
                self.stationary_tolerance
            ));
        }
        problems
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Transient state of the card being dragged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragState {
    pub item: Option<WorkoutId>,
    pub source_day: Option<Day>,
    /// Valid target under the pointer; `None` over the source day.
    pub target_day: Option<Day>,
    pub is_dragging: bool,
    /// Path length travelled so far.
    pub drag_distance: f32,
    pub touch_point: Option<Point>,
    /// Set after a committed drop until the host finishes its animation.
    pub is_drop_animating: bool,
}

/// Named coordinator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorPhase {
    Idle,
    Pressed,
    Dragging,
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Pressed { long_press_at: Option<Instant> },
    Dragging,
    Resizing { day: Day, start_width: f32 },
}

/// Why a drag ended without a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released away from any known column.
    NoTarget,
    /// Released over the column it came from.
    SameDay,
    /// Released over a column that does not accept drops.
    Rejected(Day),
    /// Touch-cancel, explicit cancel, or unmount.
    Aborted,
}

/// Output of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    DragStarted {
        item: WorkoutId,
        source: Day,
        pointer: PointerSource,
    },
    /// The highlighted target changed.
    TargetChanged { target: Option<Day> },
    /// A drag ended over a valid target; the caller should commit the move.
    Dropped {
        item: WorkoutId,
        source: Day,
        target: Day,
    },
    DropCancelled {
        item: WorkoutId,
        source: Day,
        reason: CancelReason,
    },
    /// Press and release on a card without dragging.
    Tapped { item: WorkoutId, day: Day },
    ResizeStarted { day: Day },
    Resized { day: Day, width: f32 },
    ResizeEnded { day: Day, width: f32 },
}

/// Result of feeding one event to the coordinator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorStep {
    pub prevent_default: bool,
    pub events: Vec<CoordinatorEvent>,
}

// ---------------------------------------------------------------------------
// GestureCoordinator
// ---------------------------------------------------------------------------

/// Owner of the live drag state.
#[derive(Debug)]
pub struct GestureCoordinator {
    config: CoordinatorConfig,
    card: GestureInput,
    resize: GestureInput,
    mode: Mode,
    drag: DragState,
    zones: Vec<DropZone>,
    scroll_lock: ScrollLock,
    scroll_token: Option<ScrollToken>,
}

impl GestureCoordinator {
    /// Build a coordinator. Resize handles use `gesture` with the resize
    /// threshold substituted.
    pub fn new(
        gesture: GestureConfig,
        config: CoordinatorConfig,
    ) -> Result<Self, GestureConfigError> {
        let resize = gesture.with_threshold(config.resize_threshold);
        Ok(Self {
            config,
            card: GestureInput::new(gesture)?,
            resize: GestureInput::new(resize)?,
            mode: Mode::Idle,
            drag: DragState::default(),
            zones: Vec::new(),
            scroll_lock: ScrollLock::new(),
            scroll_token: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> CoordinatorPhase {
        match self.mode {
            Mode::Idle => CoordinatorPhase::Idle,
            Mode::Pressed { .. } => CoordinatorPhase::Pressed,
            Mode::Dragging => CoordinatorPhase::Dragging,
            Mode::Resizing { .. } => CoordinatorPhase::Resizing,
        }
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Whether a long-press timer is currently armed.
    #[must_use]
    pub fn long_press_armed(&self) -> bool {
        matches!(
            self.mode,
            Mode::Pressed {
                long_press_at: Some(_)
            }
        )
    }

    #[must_use]
    pub fn scroll_lock_depth(&self) -> usize {
        self.scroll_lock.depth()
    }

    /// Listeners currently held by both gesture inputs.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.card.listener_count() + self.resize.listener_count()
    }

    /// Replace the measured column drop areas.
    pub fn set_drop_zones(&mut self, zones: Vec<DropZone>) {
        self.zones = zones;
    }

    #[must_use]
    pub fn drop_zones(&self) -> &[DropZone] {
        &self.zones
    }

    /// The host finished animating the last drop.
    pub fn finish_drop_animation(&mut self) {
        self.drag.is_drop_animating = false;
    }

    // --- Entry points ---

    /// Mouse-down or touch-start on a card. Touch arms the long-press timer;
    /// mouse drags start once the threshold is crossed. Returns `false` if a
    /// gesture is already in progress or the event cannot start one.
    pub fn press_item(
        &mut self,
        item: WorkoutId,
        day: Day,
        event: &InputEvent,
        host: &mut dyn InputHost,
        now: Instant,
    ) -> bool {
        if self.mode != Mode::Idle {
            return false;
        }
        let pointer = event.source();
        let activation = match pointer {
            PointerSource::Mouse => Activation::Threshold,
            PointerSource::Touch => Activation::Manual,
        };
        if !self.card.begin(event, activation, host) {
            return false;
        }

        let long_press_at =
            (pointer == PointerSource::Touch).then(|| now + self.config.long_press());
        self.mode = Mode::Pressed { long_press_at };
        self.drag = DragState {
            item: Some(item),
            source_day: Some(day),
            touch_point: Some(event.position()),
            ..DragState::default()
        };
        tracing::debug!(
            target: "planboard.coordinator",
            %day,
            ?pointer,
            long_press = long_press_at.is_some(),
            "card pressed"
        );
        true
    }

    /// Press on a column's resize handle.
    pub fn press_resize_handle(
        &mut self,
        day: Day,
        event: &InputEvent,
        host: &mut dyn InputHost,
        layout: &LayoutStore,
    ) -> bool {
        if self.mode != Mode::Idle || !self.resize.begin(event, Activation::Threshold, host) {
            return false;
        }
        self.mode = Mode::Resizing {
            day,
            start_width: layout.width(day),
        };
        self.drag = DragState::default();
        tracing::debug!(target: "planboard.coordinator", %day, "resize handle pressed");
        true
    }

    /// Feed a routed pointer event.
    pub fn handle_input(
        &mut self,
        event: &InputEvent,
        host: &mut dyn InputHost,
        layout: &mut LayoutStore,
        now: Instant,
    ) -> CoordinatorStep {
        match self.mode {
            Mode::Idle => CoordinatorStep::default(),
            Mode::Resizing { day, start_width } => {
                let step = self.resize.handle(event, host, now);
                let mut out = CoordinatorStep {
                    prevent_default: step.prevent_default,
                    events: Vec::new(),
                };
                for gesture in step.events {
                    self.on_resize_gesture(gesture, day, start_width, host, layout, &mut out.events);
                }
                self.settle(host);
                out
            }
            Mode::Pressed { .. } | Mode::Dragging => {
                let step = self.card.handle(event, host, now);
                self.disarm_if_scrolling();
                let mut out = CoordinatorStep {
                    prevent_default: step.prevent_default,
                    events: Vec::new(),
                };
                for gesture in step.events {
                    self.on_card_gesture(gesture, host, &mut out.events);
                }
                self.settle(host);
                out
            }
        }
    }

    /// Advance timers: long-press activation and throttled move delivery.
    pub fn tick(
        &mut self,
        now: Instant,
        host: &mut dyn InputHost,
        layout: &mut LayoutStore,
        effects: &mut SideEffects,
    ) -> Vec<CoordinatorEvent> {
        let mut events = Vec::new();
        match self.mode {
            Mode::Pressed {
                long_press_at: Some(at),
            } if now >= at => {
                if self.card.displacement() <= self.config.stationary_tolerance {
                    if let Some(start) = self.card.activate() {
                        self.on_card_gesture(start, host, &mut events);
                        effects.pulse(self.config.haptic_pulse());
                    }
                } else {
                    tracing::debug!(
                        target: "planboard.coordinator",
                        displacement = self.card.displacement(),
                        "long press expired while moving"
                    );
                    self.mode = Mode::Pressed {
                        long_press_at: None,
                    };
                }
            }
            Mode::Dragging => {
                if let Some(moved) = self.card.poll(now) {
                    self.on_card_gesture(moved, host, &mut events);
                }
            }
            Mode::Resizing { day, start_width } => {
                if let Some(moved) = self.resize.poll(now) {
                    self.on_resize_gesture(moved, day, start_width, host, layout, &mut events);
                }
            }
            Mode::Idle | Mode::Pressed { .. } => {}
        }
        events
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.mode {
            Mode::Pressed { long_press_at } => long_press_at,
            Mode::Dragging => self.card.next_deadline(),
            Mode::Resizing { .. } => self.resize.next_deadline(),
            Mode::Idle => None,
        }
    }

    /// Passive size observer for a column.
    pub fn observe_column_height(&mut self, day: Day, height: f32, layout: &mut LayoutStore) -> bool {
        layout.schedule_height(day, height)
    }

    /// Collapse or expand a column. Returns the new collapsed state.
    pub fn toggle_collapsed(&mut self, day: Day, layout: &mut LayoutStore) -> bool {
        layout.toggle_collapsed(day)
    }

    /// Abort whatever is in flight (Escape, focus loss).
    pub fn cancel(
        &mut self,
        host: &mut dyn InputHost,
        layout: &mut LayoutStore,
    ) -> Vec<CoordinatorEvent> {
        let mut events = Vec::new();
        match self.mode {
            Mode::Idle => {}
            Mode::Pressed { .. } | Mode::Dragging => {
                if let Some(cancel) = self.card.cancel(host) {
                    self.on_card_gesture(cancel, host, &mut events);
                }
            }
            Mode::Resizing { day, start_width } => {
                if let Some(cancel) = self.resize.cancel(host) {
                    self.on_resize_gesture(cancel, day, start_width, host, layout, &mut events);
                }
            }
        }
        self.finish(host);
        events
    }

    /// Teardown: pending frame writes are dropped, then the same cleanup as
    /// cancel runs. An interrupted resize has its start width written back
    /// immediately since no later frame will flush it.
    pub fn unmount(
        &mut self,
        host: &mut dyn InputHost,
        layout: &mut LayoutStore,
    ) -> Vec<CoordinatorEvent> {
        layout.discard_pending();
        let events = self.cancel(host, layout);
        layout.flush_frame();
        self.drag = DragState::default();
        tracing::debug!(target: "planboard.coordinator", "coordinator unmounted");
        events
    }
}

// ---------------------------------------------------------------------------
// Internal handlers
// ---------------------------------------------------------------------------

impl GestureCoordinator {
    fn on_card_gesture(
        &mut self,
        gesture: GestureEvent,
        host: &mut dyn InputHost,
        out: &mut Vec<CoordinatorEvent>,
    ) {
        let (Some(item), Some(source)) = (self.drag.item.clone(), self.drag.source_day) else {
            return;
        };
        match gesture {
            GestureEvent::DragStart {
                source: pointer,
                position,
                ..
            } => {
                self.mode = Mode::Dragging;
                self.drag.is_dragging = true;
                self.drag.is_drop_animating = false;
                self.drag.touch_point = Some(position);
                self.lock_scroll(host);
                tracing::debug!(target: "planboard.coordinator", item = %item, %source, "drag started");
                out.push(CoordinatorEvent::DragStarted {
                    item,
                    source,
                    pointer,
                });
            }
            GestureEvent::DragMove {
                position, distance, ..
            } => {
                self.track(position, distance);
                let target = resolve_target(position, &self.zones, source).day();
                if target != self.drag.target_day {
                    self.drag.target_day = target;
                    out.push(CoordinatorEvent::TargetChanged { target });
                }
            }
            GestureEvent::DragEnd {
                position, distance, ..
            } => {
                self.track(position, distance);
                let resolved = resolve_target(position, &self.zones, source);
                self.drag.target_day = resolved.day();
                let event = match resolved {
                    DropTarget::Valid(target) => {
                        self.drag.is_drop_animating = true;
                        CoordinatorEvent::Dropped {
                            item,
                            source,
                            target,
                        }
                    }
                    DropTarget::Source => Self::cancelled(item, source, CancelReason::SameDay),
                    DropTarget::Rejected(day) => {
                        Self::cancelled(item, source, CancelReason::Rejected(day))
                    }
                    DropTarget::Nowhere => Self::cancelled(item, source, CancelReason::NoTarget),
                };
                tracing::debug!(target: "planboard.coordinator", ?resolved, "drag ended");
                out.push(event);
            }
            GestureEvent::DragCancel { .. } => {
                tracing::debug!(target: "planboard.coordinator", item = %item, "drag aborted");
                out.push(Self::cancelled(item, source, CancelReason::Aborted));
            }
            GestureEvent::Tap { .. } => out.push(CoordinatorEvent::Tapped { item, day: source }),
        }
    }

    fn on_resize_gesture(
        &mut self,
        gesture: GestureEvent,
        day: Day,
        start_width: f32,
        host: &mut dyn InputHost,
        layout: &mut LayoutStore,
        out: &mut Vec<CoordinatorEvent>,
    ) {
        match gesture {
            GestureEvent::DragStart { .. } => {
                self.lock_scroll(host);
                out.push(CoordinatorEvent::ResizeStarted { day });
            }
            GestureEvent::DragMove {
                origin, position, ..
            } => {
                layout.schedule_width(day, start_width + (position.x - origin.x));
                out.push(CoordinatorEvent::Resized {
                    day,
                    width: layout.width(day),
                });
            }
            GestureEvent::DragEnd {
                origin, position, ..
            } => {
                layout.schedule_width(day, start_width + (position.x - origin.x));
                let width = layout.width(day);
                tracing::debug!(target: "planboard.coordinator", %day, width, "resize ended");
                out.push(CoordinatorEvent::ResizeEnded { day, width });
            }
            GestureEvent::DragCancel { .. } => {
                layout.schedule_width(day, start_width);
                out.push(CoordinatorEvent::ResizeEnded {
                    day,
                    width: layout.width(day),
                });
            }
            GestureEvent::Tap { .. } => {}
        }
    }

    fn cancelled(item: WorkoutId, source: Day, reason: CancelReason) -> CoordinatorEvent {
        CoordinatorEvent::DropCancelled {
            item,
            source,
            reason,
        }
    }

    fn track(&mut self, position: Point, distance: f32) {
        self.drag.touch_point = Some(position);
        self.drag.drag_distance = self.drag.drag_distance.max(distance);
    }

    /// Touch moved past the drag threshold before the long press fired:
    /// this is a scroll, so the timer never fires.
    fn disarm_if_scrolling(&mut self) {
        let moved_too_far =
            self.card.max_displacement() > self.card.config().drag_start_threshold;
        if self.long_press_armed() && moved_too_far {
            tracing::trace!(target: "planboard.coordinator", "long press disarmed by movement");
            self.mode = Mode::Pressed {
                long_press_at: None,
            };
        }
    }

    fn lock_scroll(&mut self, host: &mut dyn InputHost) {
        if self.scroll_token.is_none() {
            self.scroll_token = Some(self.scroll_lock.acquire(host));
        }
    }

    /// Return to idle once the underlying gesture has ended.
    fn settle(&mut self, host: &mut dyn InputHost) {
        let active = match self.mode {
            Mode::Idle => return,
            Mode::Resizing { .. } => self.resize.is_active(),
            Mode::Pressed { .. } | Mode::Dragging => self.card.is_active(),
        };
        if !active {
            self.finish(host);
        }
    }

    /// The single cleanup path.
    fn finish(&mut self, host: &mut dyn InputHost) {
        self.card.cleanup(host);
        self.resize.cleanup(host);
        if let Some(token) = self.scroll_token.take() {
            self.scroll_lock.release(token, host);
        }
        let animating = self.drag.is_drop_animating;
        self.drag = DragState {
            is_drop_animating: animating,
            ..DragState::default()
        };
        self.mode = Mode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use planboard_core::{
        HeadlessHost, MouseButton, MouseEvent, MouseEventKind, Rect, TouchEvent, TouchEventKind,
    };

    use std::rc::Rc;

    use super::*;
    use crate::layout_store::{LayoutConfig, PREFERENCES_KEY};
    use crate::storage::{MemoryStorage, PreferenceStorage};

    const MS: Duration = Duration::from_millis(1);

    struct Rig {
        host: HeadlessHost,
        layout: LayoutStore,
        effects: SideEffects,
        coord: GestureCoordinator,
        t0: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let mut coord =
                GestureCoordinator::new(GestureConfig::default(), CoordinatorConfig::default())
                    .unwrap();
            coord.set_drop_zones(
                Day::ALL
                    .into_iter()
                    .map(|d| DropZone::new(d, Rect::new(d.index() as f32 * 100.0, 0.0, 100.0, 600.0)))
                    .collect(),
            );
            Self {
                host: HeadlessHost::new(),
                layout: LayoutStore::load(MemoryStorage::new(), LayoutConfig::default()),
                effects: SideEffects::default(),
                coord,
                t0: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + MS * ms as u32
        }

        fn press(&mut self, event: InputEvent) -> bool {
            let now = self.t0;
            self.coord
                .press_item("w1".into(), Day::Monday, &event, &mut self.host, now)
        }

        fn feed(&mut self, event: InputEvent, ms: u64) -> CoordinatorStep {
            let now = self.at(ms);
            self.coord
                .handle_input(&event, &mut self.host, &mut self.layout, now)
        }

        fn tick(&mut self, ms: u64) -> Vec<CoordinatorEvent> {
            let now = self.at(ms);
            self.coord
                .tick(now, &mut self.host, &mut self.layout, &mut self.effects)
        }

        fn assert_clean(&self) {
            assert_eq!(self.coord.phase(), CoordinatorPhase::Idle);
            assert_eq!(self.host.active_listeners(), 0);
            assert_eq!(self.coord.scroll_lock_depth(), 0);
            assert!(self.host.page_scroll_enabled());
            assert!(self.coord.next_deadline().is_none());
        }
    }

    fn mouse(kind: MouseEventKind, x: f32, y: f32) -> InputEvent {
        InputEvent::Mouse(MouseEvent::new(kind, x, y))
    }

    fn down(x: f32, y: f32) -> InputEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), x, y)
    }

    fn up(x: f32, y: f32) -> InputEvent {
        mouse(MouseEventKind::Up(MouseButton::Left), x, y)
    }

    fn touch(kind: TouchEventKind, x: f32, y: f32) -> InputEvent {
        InputEvent::Touch(TouchEvent::new(kind, x, y))
    }

    // --- Mouse ---

    #[test]
    fn mouse_drag_drops_on_release_column() {
        let mut rig = Rig::new();
        assert!(rig.press(down(50.0, 50.0)));
        assert_eq!(rig.coord.phase(), CoordinatorPhase::Pressed);

        let step = rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        assert!(step.prevent_default);
        assert!(matches!(step.events[0], CoordinatorEvent::DragStarted { .. }));
        assert_eq!(
            step.events[1],
            CoordinatorEvent::TargetChanged {
                target: Some(Day::Tuesday)
            }
        );
        assert_eq!(rig.coord.scroll_lock_depth(), 1);

        // Throttled sample over Wednesday, released over Thursday.
        rig.feed(mouse(MouseEventKind::Moved, 250.0, 50.0), 12);
        let step = rig.feed(up(350.0, 50.0), 14);
        assert_eq!(
            step.events,
            vec![CoordinatorEvent::Dropped {
                item: "w1".into(),
                source: Day::Monday,
                target: Day::Thursday,
            }]
        );
        assert!(rig.coord.drag_state().is_drop_animating);
        rig.assert_clean();

        rig.coord.finish_drop_animation();
        assert_eq!(rig.coord.drag_state(), &DragState::default());
    }

    #[test]
    fn mouse_click_is_a_tap() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        let step = rig.feed(up(52.0, 51.0), 30);
        assert_eq!(
            step.events,
            vec![CoordinatorEvent::Tapped {
                item: "w1".into(),
                day: Day::Monday
            }]
        );
        rig.assert_clean();
    }

    #[test]
    fn release_over_source_cancels() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        let step = rig.feed(up(60.0, 50.0), 40);
        assert!(matches!(
            step.events[..],
            [CoordinatorEvent::DropCancelled {
                reason: CancelReason::SameDay,
                ..
            }]
        ));
        rig.assert_clean();
    }

    #[test]
    fn release_over_rejecting_column_is_reported() {
        let mut rig = Rig::new();
        let mut zones = rig.coord.drop_zones().to_vec();
        zones[2] = zones[2].rejecting();
        rig.coord.set_drop_zones(zones);
        rig.press(down(50.0, 50.0));
        rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        let step = rig.feed(up(250.0, 50.0), 40);
        assert!(matches!(
            step.events[..],
            [CoordinatorEvent::DropCancelled {
                reason: CancelReason::Rejected(Day::Wednesday),
                ..
            }]
        ));
    }

    #[test]
    fn drag_distance_is_monotonic() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        rig.feed(mouse(MouseEventKind::Moved, 50.0, 50.0), 40);
        assert_eq!(rig.coord.drag_state().drag_distance, 200.0);
    }

    #[test]
    fn throttled_moves_flush_on_tick() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        assert!(rig.feed(mouse(MouseEventKind::Moved, 250.0, 50.0), 12).events.is_empty());

        let deadline = rig.coord.next_deadline().unwrap();
        assert_eq!(deadline, rig.at(26));
        let events = rig.tick(26);
        assert_eq!(
            events,
            vec![CoordinatorEvent::TargetChanged {
                target: Some(Day::Wednesday)
            }]
        );
    }

    // --- Touch ---

    #[test]
    fn long_press_lifts_card() {
        let mut rig = Rig::new();
        rig.press(touch(TouchEventKind::Start, 50.0, 50.0));
        assert!(rig.coord.long_press_armed());
        assert_eq!(rig.coord.next_deadline(), Some(rig.at(500)));

        // Small jitter is fine.
        let step = rig.feed(touch(TouchEventKind::Move, 52.0, 51.0), 100);
        assert!(!step.prevent_default);
        assert!(rig.tick(499).is_empty());

        let events = rig.tick(500);
        assert!(matches!(
            events[..],
            [CoordinatorEvent::DragStarted {
                pointer: PointerSource::Touch,
                ..
            }]
        ));
        assert!(rig.coord.drag_state().is_dragging);
        assert!(!rig.host.page_scroll_enabled());

        rig.feed(touch(TouchEventKind::Move, 150.0, 50.0), 520);
        let step = rig.feed(touch(TouchEventKind::End, 150.0, 50.0), 540);
        assert!(matches!(step.events[..], [CoordinatorEvent::Dropped { target: Day::Tuesday, .. }]));
        rig.assert_clean();
    }

    #[test]
    fn moving_before_long_press_is_a_scroll() {
        let mut rig = Rig::new();
        rig.press(touch(TouchEventKind::Start, 50.0, 50.0));
        let step = rig.feed(touch(TouchEventKind::Move, 50.0, 120.0), 100);
        assert!(!step.prevent_default);
        assert!(!rig.coord.long_press_armed());
        assert!(rig.tick(600).is_empty());
        assert!(!rig.coord.drag_state().is_dragging);

        let step = rig.feed(touch(TouchEventKind::End, 50.0, 120.0), 700);
        assert!(step.events.is_empty());
        rig.assert_clean();
    }

    #[test]
    fn drifting_past_tolerance_blocks_long_press() {
        let mut rig = Rig::new();
        rig.press(touch(TouchEventKind::Start, 50.0, 50.0));
        rig.feed(touch(TouchEventKind::Move, 57.0, 50.0), 100);
        assert!(rig.tick(500).is_empty());
        assert_eq!(rig.coord.phase(), CoordinatorPhase::Pressed);
        assert!(!rig.coord.long_press_armed());
    }

    #[test]
    fn touch_cancel_runs_full_cleanup() {
        let mut rig = Rig::new();
        rig.press(touch(TouchEventKind::Start, 50.0, 50.0));
        rig.tick(500);
        let step = rig.feed(touch(TouchEventKind::Cancel, 50.0, 50.0), 510);
        assert!(matches!(
            step.events[..],
            [CoordinatorEvent::DropCancelled {
                reason: CancelReason::Aborted,
                ..
            }]
        ));
        rig.assert_clean();
    }

    #[test]
    fn second_press_during_gesture_is_rejected() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        let now = rig.t0;
        assert!(!rig.coord.press_item(
            "w2".into(),
            Day::Friday,
            &down(450.0, 50.0),
            &mut rig.host,
            now
        ));
        assert_eq!(rig.coord.drag_state().item, Some("w1".into()));
    }

    // --- Cancel / unmount ---

    #[test]
    fn cancel_and_unmount_are_idempotent() {
        let mut rig = Rig::new();
        rig.press(down(50.0, 50.0));
        rig.feed(mouse(MouseEventKind::Moved, 150.0, 50.0), 10);
        rig.layout.schedule_height(Day::Monday, 300.0);

        let events = rig.coord.cancel(&mut rig.host, &mut rig.layout);
        assert_eq!(events.len(), 1);
        rig.assert_clean();
        assert!(rig.coord.cancel(&mut rig.host, &mut rig.layout).is_empty());

        rig.coord.unmount(&mut rig.host, &mut rig.layout);
        rig.coord.unmount(&mut rig.host, &mut rig.layout);
        rig.assert_clean();
        assert!(!rig.layout.has_pending_frame());
    }

    #[test]
    fn unmount_mid_long_press() {
        let mut rig = Rig::new();
        rig.press(touch(TouchEventKind::Start, 50.0, 50.0));
        assert!(rig.coord.unmount(&mut rig.host, &mut rig.layout).is_empty());
        rig.assert_clean();
        assert!(rig.tick(600).is_empty());
    }

    // --- Resize / height / collapse ---

    #[test]
    fn resize_updates_width_through_frames() {
        let mut rig = Rig::new();
        let layout = &rig.layout;
        assert!(rig.coord.press_resize_handle(
            Day::Tuesday,
            &down(200.0, 10.0),
            &mut rig.host,
            layout
        ));
        assert_eq!(rig.coord.phase(), CoordinatorPhase::Resizing);

        let step = rig.feed(mouse(MouseEventKind::Moved, 230.0, 10.0), 10);
        assert_eq!(
            step.events,
            vec![
                CoordinatorEvent::ResizeStarted { day: Day::Tuesday },
                CoordinatorEvent::Resized {
                    day: Day::Tuesday,
                    width: 310.0
                },
            ]
        );
        assert_eq!(rig.coord.scroll_lock_depth(), 1);

        let step = rig.feed(up(260.0, 10.0), 20);
        assert_eq!(
            step.events,
            vec![CoordinatorEvent::ResizeEnded {
                day: Day::Tuesday,
                width: 340.0
            }]
        );
        rig.assert_clean();

        assert_eq!(rig.layout.preferences().width[Day::Tuesday], 280.0);
        rig.layout.flush_frame();
        assert_eq!(rig.layout.preferences().width[Day::Tuesday], 340.0);
    }

    #[test]
    fn resize_width_is_clamped() {
        let mut rig = Rig::new();
        let layout = &rig.layout;
        rig.coord
            .press_resize_handle(Day::Monday, &down(100.0, 10.0), &mut rig.host, layout);
        rig.feed(mouse(MouseEventKind::Moved, -900.0, 10.0), 10);
        let step = rig.feed(up(-900.0, 10.0), 20);
        assert_eq!(
            step.events,
            vec![CoordinatorEvent::ResizeEnded {
                day: Day::Monday,
                width: 160.0
            }]
        );
    }

    #[test]
    fn cancelled_resize_restores_start_width() {
        let mut rig = Rig::new();
        let layout = &rig.layout;
        rig.coord
            .press_resize_handle(Day::Friday, &down(500.0, 10.0), &mut rig.host, layout);
        rig.feed(mouse(MouseEventKind::Moved, 600.0, 10.0), 10);
        rig.coord.cancel(&mut rig.host, &mut rig.layout);
        assert_eq!(rig.layout.width(Day::Friday), 280.0);
        rig.assert_clean();
    }

    #[test]
    fn unmount_after_flushed_resize_restores_start_width() {
        let storage = Rc::new(MemoryStorage::new());
        let mut rig = Rig::new();
        rig.layout = LayoutStore::load(Rc::clone(&storage), LayoutConfig::default());
        let layout = &rig.layout;
        rig.coord
            .press_resize_handle(Day::Tuesday, &down(200.0, 10.0), &mut rig.host, layout);
        rig.feed(mouse(MouseEventKind::Moved, 300.0, 10.0), 10);
        assert_eq!(rig.layout.flush_frame(), 1);
        assert_eq!(rig.layout.preferences().width[Day::Tuesday], 380.0);

        let events = rig.coord.unmount(&mut rig.host, &mut rig.layout);
        assert_eq!(
            events,
            vec![CoordinatorEvent::ResizeEnded {
                day: Day::Tuesday,
                width: 280.0
            }]
        );
        rig.assert_clean();
        assert!(!rig.layout.has_pending_frame());
        assert_eq!(rig.layout.flush_frame(), 0);
        assert_eq!(rig.layout.preferences().width[Day::Tuesday], 280.0);

        let raw = storage.get(PREFERENCES_KEY).unwrap().unwrap();
        let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(blob["width"]["tuesday"], 280.0);
    }

    #[test]
    fn height_and_collapse_go_to_layout() {
        let mut rig = Rig::new();
        assert!(rig
            .coord
            .observe_column_height(Day::Sunday, 480.0, &mut rig.layout));
        assert!(!rig
            .coord
            .observe_column_height(Day::Sunday, 500.0, &mut rig.layout));
        rig.layout.flush_frame();
        assert_eq!(rig.layout.preferences().height[Day::Sunday], 500.0);

        assert!(rig.coord.toggle_collapsed(Day::Sunday, &mut rig.layout));
        assert!(rig.layout.is_collapsed(Day::Sunday));
    }
}
