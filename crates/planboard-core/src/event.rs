#![forbid(unsafe_code)]

//! Canonical pointer input events.
//!
//! Hosts translate their native mouse and touch events into [`InputEvent`]
//! before handing them to the gesture layer. The gesture layer only cares
//! about three things: which device produced the event, which lifecycle
//! phase it belongs to, and where the primary contact is.
//!
//! # Design Notes
//!
//! - Coordinates are client-space pixels.
//! - A touch event reports the primary contact's position plus the number of
//!   contacts currently on the surface; more than one means pinch/multi-touch.

use crate::geometry::Point;

/// Canonical pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A mouse event.
    Mouse(MouseEvent),

    /// A touch event.
    Touch(TouchEvent),
}

impl InputEvent {
    /// Position of the primary contact.
    #[must_use]
    pub const fn position(&self) -> Point {
        match self {
            Self::Mouse(m) => Point::new(m.x, m.y),
            Self::Touch(t) => Point::new(t.x, t.y),
        }
    }

    /// Device that produced the event.
    #[must_use]
    pub const fn source(&self) -> PointerSource {
        match self {
            Self::Mouse(_) => PointerSource::Mouse,
            Self::Touch(_) => PointerSource::Touch,
        }
    }

    /// Lifecycle phase, unified across devices.
    #[must_use]
    pub const fn phase(&self) -> PointerPhase {
        match self {
            Self::Mouse(m) => match m.kind {
                MouseEventKind::Down(_) => PointerPhase::Start,
                MouseEventKind::Moved => PointerPhase::Move,
                MouseEventKind::Up(_) => PointerPhase::End,
            },
            Self::Touch(t) => match t.kind {
                TouchEventKind::Start => PointerPhase::Start,
                TouchEventKind::Move => PointerPhase::Move,
                TouchEventKind::End => PointerPhase::End,
                TouchEventKind::Cancel => PointerPhase::Cancel,
            },
        }
    }

    /// True when more than one finger is on the surface.
    #[must_use]
    pub const fn is_multi_touch(&self) -> bool {
        matches!(self, Self::Touch(t) if t.touch_count > 1)
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// The type of mouse event.
    pub kind: MouseEventKind,

    /// Client X coordinate.
    pub x: f32,

    /// Client Y coordinate.
    pub y: f32,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Button pressed.
    Down(MouseButton),

    /// Button released.
    Up(MouseButton),

    /// Pointer moved (with or without a button held).
    Moved,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,

    /// Right mouse button.
    Right,

    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// A touch event for the primary contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// The type of touch event.
    pub kind: TouchEventKind,

    /// Client X coordinate of the primary contact.
    pub x: f32,

    /// Client Y coordinate of the primary contact.
    pub y: f32,

    /// Contacts currently on the surface (0 after the last finger lifts).
    pub touch_count: u8,
}

impl TouchEvent {
    /// Create a single-contact touch event.
    #[must_use]
    pub const fn new(kind: TouchEventKind, x: f32, y: f32) -> Self {
        let touch_count = match kind {
            TouchEventKind::End | TouchEventKind::Cancel => 0,
            TouchEventKind::Start | TouchEventKind::Move => 1,
        };
        Self {
            kind,
            x,
            y,
            touch_count,
        }
    }

    /// Override the number of contacts on the surface.
    #[must_use]
    pub const fn with_touch_count(mut self, touch_count: u8) -> Self {
        self.touch_count = touch_count;
        self
    }
}

/// The type of touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventKind {
    Start,
    Move,
    End,
    /// The platform aborted the touch (incoming call, gesture takeover, ...).
    Cancel,
}

/// Device family that produced a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Device-independent lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}
