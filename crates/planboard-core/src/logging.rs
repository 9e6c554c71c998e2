#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports the tracing macros used by this crate when the `tracing`
//! feature is enabled. When the feature is disabled, no-op macros with the
//! same names are provided so call sites compile unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}
