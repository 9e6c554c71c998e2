#![forbid(unsafe_code)]

//! Bounded-latency rate limiting for high-frequency drag moves.
//!
//! Pointer devices can report far more move events than a board needs to
//! re-highlight drop targets. [`MoveThrottle`] forwards at most one sample per
//! `min_interval` while guaranteeing that a requested sample is never held
//! longer than `max_latency`.
//!
//! # Design
//!
//! The throttle uses a "latest wins" strategy:
//! - A request outside the interval is forwarded immediately.
//! - A request inside the interval replaces any pending sample but keeps the
//!   original request time, so the latency bound is measured from the first
//!   unserved request.
//! - The host asks [`deadline`](MoveThrottle::deadline) when to call
//!   [`poll`](MoveThrottle::poll) next (a timer or animation frame).
//!
//! # Invariants
//!
//! 1. Two forwarded samples are never closer than `min_interval` (given
//!    `min_interval <= max_latency`, which gesture config validation enforces).
//! 2. `deadline() <= first unserved request + max_latency` whenever a sample
//!    is pending.
//! 3. After [`cancel`](MoveThrottle::cancel) nothing is pending.

use std::time::Duration;

use web_time::Instant;

/// Timing limits for a [`MoveThrottle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Minimum spacing between forwarded samples (default: 16ms, ~60 Hz).
    pub min_interval: Duration,
    /// Upper bound on how long a request may stay pending (default: 32ms).
    pub max_latency: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(16),
            max_latency: Duration::from_millis(32),
        }
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    sample: T,
    requested_at: Instant,
}

/// Latest-wins throttle with a latency bound.
///
/// Not thread-safe; owned by the single gesture that feeds it.
#[derive(Debug, Clone)]
pub struct MoveThrottle<T> {
    config: ThrottleConfig,
    last_emit: Option<Instant>,
    pending: Option<Pending<T>>,
}

impl<T> MoveThrottle<T> {
    #[must_use]
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            last_emit: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> ThrottleConfig {
        self.config
    }

    /// Offer a sample. Returns it back if it may be forwarded right now,
    /// otherwise stores it as the pending sample and returns `None`.
    pub fn request(&mut self, sample: T, now: Instant) -> Option<T> {
        let requested_at = self
            .pending
            .take()
            .map_or(now, |pending| pending.requested_at);
        self.pending = Some(Pending {
            sample,
            requested_at,
        });
        self.poll(now)
    }

    /// Forward the pending sample if its slot has arrived.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        let pending = self.pending.take()?;
        self.last_emit = Some(now);
        Some(pending.sample)
    }

    /// When the pending sample becomes due, or `None` if nothing is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let pending = self.pending.as_ref()?;
        let latest = pending.requested_at + self.config.max_latency;
        let slot = match self.last_emit {
            Some(last) => last + self.config.min_interval,
            None => pending.requested_at,
        };
        Some(slot.min(latest).max(pending.requested_at))
    }

    /// Drop the pending sample. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Forget all history, as if freshly constructed.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_emit = None;
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_request_passes_through() {
        let mut t = MoveThrottle::new(ThrottleConfig::default());
        let now = Instant::now();
        assert_eq!(t.request(1, now), Some(1));
        assert!(!t.has_pending());
    }

    #[test]
    fn requests_inside_interval_coalesce_latest_wins() {
        let mut t = MoveThrottle::new(ThrottleConfig::default());
        let t0 = Instant::now();
        assert_eq!(t.request(1, t0), Some(1));
        assert_eq!(t.request(2, t0 + 4 * MS), None);
        assert_eq!(t.request(3, t0 + 8 * MS), None);
        assert_eq!(t.deadline(), Some(t0 + 16 * MS));
        assert_eq!(t.poll(t0 + 10 * MS), None);
        assert_eq!(t.poll(t0 + 16 * MS), Some(3));
        assert_eq!(t.poll(t0 + 40 * MS), None);
    }

    #[test]
    fn request_after_interval_passes_through() {
        let mut t = MoveThrottle::new(ThrottleConfig::default());
        let t0 = Instant::now();
        t.request(1, t0);
        assert_eq!(t.request(2, t0 + 20 * MS), Some(2));
    }

    #[test]
    fn deadline_never_exceeds_latency_bound() {
        let config = ThrottleConfig {
            min_interval: Duration::from_millis(50),
            max_latency: Duration::from_millis(32),
        };
        let mut t = MoveThrottle::new(config);
        let t0 = Instant::now();
        t.request(1, t0);
        t.request(2, t0 + MS);
        assert_eq!(t.deadline(), Some(t0 + 33 * MS));
    }

    #[test]
    fn cancel_drops_pending() {
        let mut t = MoveThrottle::new(ThrottleConfig::default());
        let t0 = Instant::now();
        t.request(1, t0);
        t.request(2, t0 + MS);
        assert!(t.cancel());
        assert!(!t.cancel());
        assert_eq!(t.poll(t0 + 100 * MS), None);
        assert_eq!(t.deadline(), None);
    }

    #[test]
    fn reset_allows_immediate_forward() {
        let mut t = MoveThrottle::new(ThrottleConfig::default());
        let t0 = Instant::now();
        t.request(1, t0);
        t.reset();
        assert_eq!(t.request(2, t0 + MS), Some(2));
    }
}
