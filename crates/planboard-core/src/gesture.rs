#![forbid(unsafe_code)]

//! Gesture unification: one drag model for mouse and touch.
//!
//! [`GestureInput`] is a stateful processor that turns the raw
//! [`InputEvent`] stream of a single press-to-release interaction into
//! [`GestureEvent`]s (`DragStart`, `DragMove`, `DragEnd`, `DragCancel`, `Tap`).
//! Callers react to the variants they care about; ignoring a variant is the
//! same as not registering a callback for it.
//!
//! # State Machine
//!
//! ```text
//!            begin()                 threshold crossed / activate()
//!   Idle ───────────────► Pending ─────────────────────────────► Dragging
//!    ▲                       │ end: Tap (if it stayed short)         │
//!    │                       │ cancel: nothing                       │ end: DragEnd
//!    └───────────────────────┴───────────────────────────────────────┘ cancel: DragCancel
//! ```
//!
//! # Invariants
//!
//! 1. Drag and Tap never both emit for the same interaction.
//! 2. `DragStart` is emitted at most once per interaction and always precedes
//!    any `DragMove`.
//! 3. Until the drag starts, steps report `prevent_default = false` so the
//!    platform keeps its scroll/click behavior.
//! 4. Every exit path (end, cancel, [`cleanup`](GestureInput::cleanup))
//!    releases every listener acquired by [`begin`](GestureInput::begin) and
//!    drops the pending throttled move. Exiting twice is a no-op.
//! 5. `DragEnd` carries the release coordinate, never a throttled sample.
//!
//! # Failure Modes
//!
//! - Events from a different device than the one that began the gesture are
//!   ignored.
//! - Multi-touch moves during a touch gesture are ignored for movement but do
//!   not abort it; while dragging they are default-prevented to block pinch
//!   zoom.

use std::time::Duration;

use thiserror::Error;
use web_time::Instant;

use crate::event::{InputEvent, MouseButton, MouseEventKind, PointerPhase, PointerSource};
use crate::geometry::Point;
use crate::host::{InputHost, ListenerKind, ListenerSet};
use crate::throttle::{MoveThrottle, ThrottleConfig};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and timing for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Euclidean distance (px) the pointer must exceed before a press becomes
    /// a drag (default: 8.0).
    pub drag_start_threshold: f32,
    /// Move forwarding limits (default: 16ms interval, 32ms latency bound).
    pub throttle: ThrottleConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_start_threshold: 8.0,
            throttle: ThrottleConfig::default(),
        }
    }
}

impl GestureConfig {
    /// Replace the drag start threshold.
    #[must_use]
    pub fn with_threshold(mut self, px: f32) -> Self {
        self.drag_start_threshold = px;
        self
    }

    /// Replace the move sample interval.
    #[must_use]
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.throttle.min_interval = interval;
        self
    }

    /// Check that the configuration can drive a gesture.
    pub fn validate(&self) -> Result<(), GestureConfigError> {
        let threshold = self.drag_start_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(GestureConfigError::InvalidThreshold(threshold));
        }
        if self.throttle.min_interval.is_zero() {
            return Err(GestureConfigError::ZeroSampleInterval);
        }
        if self.throttle.max_latency < self.throttle.min_interval {
            return Err(GestureConfigError::LatencyBelowInterval {
                interval: self.throttle.min_interval,
                latency: self.throttle.max_latency,
            });
        }
        Ok(())
    }
}

/// Rejected [`GestureConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureConfigError {
    #[error("drag start threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),

    #[error("move sample interval must be non-zero")]
    ZeroSampleInterval,

    #[error("max move latency {latency:?} is shorter than the sample interval {interval:?}")]
    LatencyBelowInterval {
        interval: Duration,
        latency: Duration,
    },
}

/// How a pending press turns into a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// Crossing `drag_start_threshold` starts the drag (mouse, resize handles).
    #[default]
    Threshold,
    /// The owner calls [`GestureInput::activate`] (touch long-press). Moves
    /// before that are only measured.
    Manual,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// High-level gesture events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    DragStart {
        source: PointerSource,
        origin: Point,
        position: Point,
    },
    DragMove {
        origin: Point,
        position: Point,
        /// Path length travelled since `begin`.
        distance: f32,
    },
    DragEnd {
        origin: Point,
        /// Release coordinate.
        position: Point,
        distance: f32,
    },
    DragCancel {
        origin: Point,
        last: Point,
    },
    /// Press and release without becoming a drag.
    Tap {
        source: PointerSource,
        position: Point,
    },
}

/// Result of feeding one event to a [`GestureInput`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureStep {
    /// Whether the host should call `preventDefault()` on the native event.
    pub prevent_default: bool,
    pub events: Vec<GestureEvent>,
}

impl GestureStep {
    fn prevented(prevent_default: bool) -> Self {
        Self {
            prevent_default,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GestureInput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending,
    Dragging,
}

#[derive(Debug, Clone, Copy)]
struct MoveSample {
    position: Point,
    distance: f32,
}

/// Single-gesture input unifier.
///
/// Call [`begin`](Self::begin) from the press handler, feed every routed
/// event to [`handle`](Self::handle), and call [`poll`](Self::poll) at
/// [`next_deadline`](Self::next_deadline) to flush throttled moves.
#[derive(Debug)]
pub struct GestureInput {
    config: GestureConfig,
    phase: Phase,
    activation: Activation,
    source: Option<PointerSource>,
    origin: Point,
    last: Point,
    max_displacement: f32,
    path_length: f32,
    listeners: ListenerSet,
    throttle: MoveThrottle<MoveSample>,
}

impl GestureInput {
    /// Create an idle unifier with a validated configuration.
    pub fn new(config: GestureConfig) -> Result<Self, GestureConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            activation: Activation::Threshold,
            source: None,
            origin: Point::default(),
            last: Point::default(),
            max_displacement: 0.0,
            path_length: 0.0,
            listeners: ListenerSet::new(),
            throttle: MoveThrottle::new(config.throttle),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Start tracking a gesture from a mouse-down or touch-start.
    ///
    /// Returns `false` (and acquires nothing) when a gesture is already in
    /// progress or the event cannot start one: not a start phase, not the
    /// primary mouse button, or a multi-finger touch.
    pub fn begin(
        &mut self,
        origin: &InputEvent,
        activation: Activation,
        host: &mut dyn InputHost,
    ) -> bool {
        if self.phase != Phase::Idle || origin.phase() != PointerPhase::Start {
            return false;
        }
        match origin {
            InputEvent::Mouse(m) if m.kind != MouseEventKind::Down(MouseButton::Left) => {
                return false;
            }
            InputEvent::Touch(_) if origin.is_multi_touch() => return false,
            _ => {}
        }

        let source = origin.source();
        let kinds = match source {
            PointerSource::Mouse => ListenerKind::MOUSE,
            PointerSource::Touch => ListenerKind::TOUCH,
        };
        self.listeners.attach(host, kinds);
        self.throttle.reset();

        let at = origin.position();
        self.phase = Phase::Pending;
        self.activation = activation;
        self.source = Some(source);
        self.origin = at;
        self.last = at;
        self.max_displacement = 0.0;
        self.path_length = 0.0;

        crate::trace!(
            target: "planboard.gesture",
            ?source,
            ?activation,
            x = at.x,
            y = at.y,
            "gesture begin"
        );
        true
    }

    /// Process one routed event.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        host: &mut dyn InputHost,
        now: Instant,
    ) -> GestureStep {
        if self.phase == Phase::Idle || self.source != Some(event.source()) {
            return GestureStep::default();
        }

        match event.phase() {
            // A second finger landing; the guard listener routes it here.
            PointerPhase::Start => GestureStep::prevented(self.is_dragging()),
            PointerPhase::Move => self.on_move(event, now),
            PointerPhase::End => {
                if matches!(event, InputEvent::Mouse(m) if m.kind != MouseEventKind::Up(MouseButton::Left))
                {
                    return GestureStep::default();
                }
                self.on_end(event.position(), host)
            }
            PointerPhase::Cancel => {
                let was_dragging = self.is_dragging();
                let events = self.cancel(host).into_iter().collect();
                GestureStep {
                    prevent_default: was_dragging,
                    events,
                }
            }
        }
    }

    /// Promote a pending [`Activation::Manual`] gesture to a drag.
    ///
    /// Returns the `DragStart`, or `None` when there is nothing pending.
    pub fn activate(&mut self) -> Option<GestureEvent> {
        if self.phase != Phase::Pending {
            return None;
        }
        self.start_drag();
        Some(GestureEvent::DragStart {
            source: self.source?,
            origin: self.origin,
            position: self.last,
        })
    }

    /// Flush a throttled move whose slot has arrived.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        if self.phase != Phase::Dragging {
            return None;
        }
        self.throttle.poll(now).map(|s| self.drag_move(s))
    }

    /// When [`poll`](Self::poll) should next be called, if ever.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.phase == Phase::Dragging {
            self.throttle.deadline()
        } else {
            None
        }
    }

    /// Abort the gesture. Returns `DragCancel` if a drag was in progress.
    pub fn cancel(&mut self, host: &mut dyn InputHost) -> Option<GestureEvent> {
        if self.phase == Phase::Idle && self.listeners.is_empty() {
            return None;
        }
        let event = (self.phase == Phase::Dragging).then_some(GestureEvent::DragCancel {
            origin: self.origin,
            last: self.last,
        });
        if event.is_some() {
            crate::debug!(target: "planboard.gesture", "drag cancelled");
        }
        self.release(host);
        event
    }

    /// Teardown path: release everything without reporting. Idempotent.
    /// Returns the number of listeners released by this call.
    pub fn cleanup(&mut self, host: &mut dyn InputHost) -> usize {
        let held = self.listeners.len();
        let _ = self.cancel(host);
        held
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::Dragging
    }

    #[must_use]
    pub fn source(&self) -> Option<PointerSource> {
        self.source
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[must_use]
    pub fn last_position(&self) -> Point {
        self.last
    }

    /// Current straight-line distance from the origin.
    #[must_use]
    pub fn displacement(&self) -> f32 {
        self.origin.distance(self.last)
    }

    /// Largest displacement seen during this gesture.
    #[must_use]
    pub fn max_displacement(&self) -> f32 {
        self.max_displacement
    }

    /// Total path length travelled during this gesture (monotonic).
    #[must_use]
    pub fn path_length(&self) -> f32 {
        self.path_length
    }

    /// Listeners currently held for this gesture.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureInput {
    fn on_move(&mut self, event: &InputEvent, now: Instant) -> GestureStep {
        if event.is_multi_touch() {
            return GestureStep::prevented(self.is_dragging());
        }

        self.track(event.position());
        let mut step = GestureStep::default();

        if self.phase == Phase::Pending {
            let crossed = self.displacement() > self.config.drag_start_threshold;
            if self.activation != Activation::Threshold || !crossed {
                return step;
            }
            self.start_drag();
            if let Some(source) = self.source {
                step.events.push(GestureEvent::DragStart {
                    source,
                    origin: self.origin,
                    position: self.last,
                });
            }
        }

        step.prevent_default = true;
        let sample = MoveSample {
            position: self.last,
            distance: self.path_length,
        };
        if let Some(sample) = self.throttle.request(sample, now) {
            step.events.push(self.drag_move(sample));
        }
        step
    }

    fn on_end(&mut self, at: Point, host: &mut dyn InputHost) -> GestureStep {
        self.track(at);
        let event = if self.phase == Phase::Dragging {
            crate::debug!(
                target: "planboard.gesture",
                distance = self.path_length,
                "drag end"
            );
            Some(GestureEvent::DragEnd {
                origin: self.origin,
                position: at,
                distance: self.path_length,
            })
        } else if self.max_displacement <= self.config.drag_start_threshold {
            self.source.map(|source| GestureEvent::Tap {
                source,
                position: at,
            })
        } else {
            // Moved too far for a tap but never activated: a scroll.
            None
        };
        let prevent_default = self.phase == Phase::Dragging;
        self.release(host);
        GestureStep {
            prevent_default,
            events: event.into_iter().collect(),
        }
    }

    fn track(&mut self, at: Point) {
        self.path_length += self.last.distance(at);
        self.last = at;
        self.max_displacement = self.max_displacement.max(self.displacement());
    }

    fn start_drag(&mut self) {
        self.phase = Phase::Dragging;
        self.throttle.reset();
        crate::debug!(
            target: "planboard.gesture",
            x = self.origin.x,
            y = self.origin.y,
            "drag start"
        );
    }

    fn drag_move(&self, sample: MoveSample) -> GestureEvent {
        GestureEvent::DragMove {
            origin: self.origin,
            position: sample.position,
            distance: sample.distance,
        }
    }

    fn release(&mut self, host: &mut dyn InputHost) {
        self.listeners.release(host);
        self.throttle.reset();
        self.phase = Phase::Idle;
        self.source = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseEvent, TouchEvent, TouchEventKind};
    use crate::host::HeadlessHost;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    fn mouse_down(x: f32, y: f32) -> InputEvent {
        InputEvent::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            x,
            y,
        ))
    }

    fn mouse_move(x: f32, y: f32) -> InputEvent {
        InputEvent::Mouse(MouseEvent::new(MouseEventKind::Moved, x, y))
    }

    fn mouse_up(x: f32, y: f32) -> InputEvent {
        InputEvent::Mouse(MouseEvent::new(MouseEventKind::Up(MouseButton::Left), x, y))
    }

    fn touch(kind: TouchEventKind, x: f32, y: f32) -> InputEvent {
        InputEvent::Touch(TouchEvent::new(kind, x, y))
    }

    fn input() -> GestureInput {
        GestureInput::new(GestureConfig::default()).unwrap()
    }

    fn count_starts(events: &[GestureEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GestureEvent::DragStart { .. }))
            .count()
    }

    // --- Threshold ---

    #[test]
    fn below_threshold_is_a_tap() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();

        assert!(g.begin(&mouse_down(10.0, 10.0), Activation::Threshold, &mut host));
        let step = g.handle(&mouse_move(13.0, 14.0), &mut host, t + MS);
        assert!(step.is_empty());
        assert!(!step.prevent_default);

        let step = g.handle(&mouse_up(13.0, 14.0), &mut host, t + 2 * MS);
        assert_eq!(step.events.len(), 1);
        assert!(matches!(step.events[0], GestureEvent::Tap { .. }));
        assert!(!g.is_active());
    }

    #[test]
    fn crossing_threshold_starts_exactly_once() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);

        let mut all = Vec::new();
        for i in 1..=20u32 {
            let step = g.handle(&mouse_move(i as f32 * 2.0, 0.0), &mut host, t + i * MS);
            all.extend(step.events);
        }
        assert_eq!(count_starts(&all), 1);
        assert!(g.is_dragging());
    }

    #[test]
    fn prevent_default_only_after_threshold() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);

        assert!(!g.handle(&mouse_move(5.0, 0.0), &mut host, t).prevent_default);
        let step = g.handle(&mouse_move(9.0, 0.0), &mut host, t + MS);
        assert!(step.prevent_default);
        assert!(matches!(step.events[0], GestureEvent::DragStart { .. }));
        assert!(matches!(step.events[1], GestureEvent::DragMove { .. }));
    }

    #[test]
    fn threshold_uses_euclidean_distance() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        // Manhattan 10, Euclidean ~7.07: still below 8.
        assert!(g.handle(&mouse_move(5.0, 5.0), &mut host, t).is_empty());
        assert!(!g.is_dragging());
    }

    // --- Drag lifecycle ---

    #[test]
    fn drag_end_reports_release_coordinate() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&mouse_move(20.0, 0.0), &mut host, t);
        // Throttled: stays pending.
        g.handle(&mouse_move(30.0, 0.0), &mut host, t + MS);

        let step = g.handle(&mouse_up(42.0, 0.0), &mut host, t + 2 * MS);
        assert!(step.prevent_default);
        assert_eq!(
            step.events,
            vec![GestureEvent::DragEnd {
                origin: Point::new(0.0, 0.0),
                position: Point::new(42.0, 0.0),
                distance: 42.0,
            }]
        );
        assert_eq!(g.poll(t + 100 * MS), None);
    }

    #[test]
    fn throttled_moves_flush_on_poll() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&mouse_move(20.0, 0.0), &mut host, t);
        assert!(g.handle(&mouse_move(25.0, 0.0), &mut host, t + 2 * MS).is_empty());
        assert!(g.handle(&mouse_move(30.0, 0.0), &mut host, t + 4 * MS).is_empty());

        let deadline = g.next_deadline().unwrap();
        assert_eq!(deadline, t + 16 * MS);
        match g.poll(deadline) {
            Some(GestureEvent::DragMove { position, .. }) => {
                assert_eq!(position, Point::new(30.0, 0.0));
            }
            other => panic!("expected DragMove, got {other:?}"),
        }
    }

    #[test]
    fn distance_is_monotonic_path_length() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&mouse_move(20.0, 0.0), &mut host, t);
        g.handle(&mouse_move(0.0, 0.0), &mut host, t + 20 * MS);
        assert_eq!(g.path_length(), 40.0);
        assert_eq!(g.displacement(), 0.0);
        assert_eq!(g.max_displacement(), 20.0);
    }

    #[test]
    fn right_button_does_not_begin() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let right = InputEvent::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Right),
            0.0,
            0.0,
        ));
        assert!(!g.begin(&right, Activation::Threshold, &mut host));
        assert_eq!(host.active_listeners(), 0);
    }

    #[test]
    fn second_begin_is_rejected() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        assert!(g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host));
        assert!(!g.begin(&mouse_down(5.0, 5.0), Activation::Threshold, &mut host));
        assert_eq!(host.active_listeners(), 2);
    }

    #[test]
    fn foreign_device_events_are_ignored() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        let step = g.handle(&touch(TouchEventKind::End, 50.0, 50.0), &mut host, t);
        assert!(step.is_empty());
        assert!(g.is_active());
    }

    // --- Touch ---

    #[test]
    fn touch_acquires_guard_and_releases_on_end() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&touch(TouchEventKind::Start, 0.0, 0.0), Activation::Threshold, &mut host);
        assert!(host.has_listener(ListenerKind::MultiTouchGuard));
        assert_eq!(g.listener_count(), 4);

        g.handle(&touch(TouchEventKind::End, 0.0, 0.0), &mut host, t);
        assert_eq!(host.active_listeners(), 0);
    }

    #[test]
    fn multi_touch_moves_are_ignored_but_do_not_abort() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&touch(TouchEventKind::Start, 0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&touch(TouchEventKind::Move, 20.0, 0.0), &mut host, t);
        assert!(g.is_dragging());

        let pinch = InputEvent::Touch(
            TouchEvent::new(TouchEventKind::Move, 200.0, 200.0).with_touch_count(2),
        );
        let step = g.handle(&pinch, &mut host, t + 20 * MS);
        assert!(step.prevent_default);
        assert!(step.is_empty());
        assert!(g.is_dragging());
        assert_eq!(g.last_position(), Point::new(20.0, 0.0));
    }

    #[test]
    fn touch_cancel_emits_drag_cancel() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&touch(TouchEventKind::Start, 0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&touch(TouchEventKind::Move, 20.0, 0.0), &mut host, t);

        let step = g.handle(&touch(TouchEventKind::Cancel, 20.0, 0.0), &mut host, t + MS);
        assert!(matches!(step.events[..], [GestureEvent::DragCancel { .. }]));
        assert_eq!(host.active_listeners(), 0);
        assert!(!g.is_active());
    }

    #[test]
    fn manual_activation_ignores_threshold() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&touch(TouchEventKind::Start, 0.0, 0.0), Activation::Manual, &mut host);
        let step = g.handle(&touch(TouchEventKind::Move, 2.0, 0.0), &mut host, t);
        assert!(step.is_empty());
        assert!(!step.prevent_default);

        assert!(matches!(g.activate(), Some(GestureEvent::DragStart { .. })));
        assert!(g.activate().is_none());
        let step = g.handle(&touch(TouchEventKind::Move, 4.0, 0.0), &mut host, t + MS);
        assert!(step.prevent_default);
        assert!(matches!(step.events[..], [GestureEvent::DragMove { .. }]));
    }

    #[test]
    fn scroll_before_manual_activation_is_not_a_tap() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&touch(TouchEventKind::Start, 0.0, 0.0), Activation::Manual, &mut host);
        g.handle(&touch(TouchEventKind::Move, 0.0, 80.0), &mut host, t);
        let step = g.handle(&touch(TouchEventKind::End, 0.0, 80.0), &mut host, t + MS);
        assert!(step.is_empty());
    }

    // --- Cleanup ---

    #[test]
    fn cleanup_is_idempotent() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&mouse_move(20.0, 0.0), &mut host, t);
        g.handle(&mouse_move(25.0, 0.0), &mut host, t + MS);

        assert_eq!(g.cleanup(&mut host), 2);
        assert_eq!(g.cleanup(&mut host), 0);
        assert_eq!(host.active_listeners(), 0);
        assert!(g.next_deadline().is_none());
    }

    #[test]
    fn end_then_cleanup_leaves_nothing() {
        let mut host = HeadlessHost::new();
        let mut g = input();
        let t = Instant::now();
        g.begin(&mouse_down(0.0, 0.0), Activation::Threshold, &mut host);
        g.handle(&mouse_up(0.0, 0.0), &mut host, t);
        assert_eq!(g.cleanup(&mut host), 0);
        assert_eq!(host.active_listeners(), 0);
    }

    // --- Config ---

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(
            GestureInput::new(GestureConfig::default().with_threshold(-1.0)),
            Err(GestureConfigError::InvalidThreshold(_))
        ));
        assert_eq!(
            GestureConfig::default()
                .with_sample_interval(Duration::ZERO)
                .validate(),
            Err(GestureConfigError::ZeroSampleInterval)
        );
        assert!(matches!(
            GestureConfig::default()
                .with_sample_interval(Duration::from_millis(64))
                .validate(),
            Err(GestureConfigError::LatencyBelowInterval { .. })
        ));
    }
}
