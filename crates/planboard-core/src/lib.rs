#![forbid(unsafe_code)]

//! Core: input events, gesture unification, days, and geometry.
//!
//! # Role in planboard
//! `planboard-core` is the input layer. It turns raw mouse and touch events
//! into one drag/tap gesture model and owns the small value types (days,
//! points, rectangles) every other crate shares.
//!
//! # Primary responsibilities
//! - **GestureInput**: start/move/end unification with threshold-based drag
//!   detection and scoped listener acquisition.
//! - **MoveThrottle**: bounded-latency rate limiting of drag moves.
//! - **Day / DayMap**: the seven fixed board columns with exhaustive indexing.
//! - **InputHost**: the seam to the platform's document listeners and page
//!   scrolling.
//!
//! # How it fits in the system
//! `planboard-runtime` consumes [`gesture::GestureEvent`] values to drive the
//! coordinator and move engine. Nothing in this crate knows about workouts.

pub mod day;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod logging;
pub mod throttle;

pub use day::{Day, DayMap, ParseDayError};
pub use event::{
    InputEvent, MouseButton, MouseEvent, MouseEventKind, PointerPhase, PointerSource, TouchEvent,
    TouchEventKind,
};
pub use geometry::{Point, Rect};
pub use gesture::{
    Activation, GestureConfig, GestureConfigError, GestureEvent, GestureInput, GestureStep,
};
pub use host::{HeadlessHost, HostCall, InputHost, ListenerId, ListenerKind, ListenerSet};
pub use throttle::{MoveThrottle, ThrottleConfig};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
