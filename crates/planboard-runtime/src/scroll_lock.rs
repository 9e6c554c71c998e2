#![forbid(unsafe_code)]

//! Reference-counted page scroll suppression.
//!
//! Dragging a card on a touch screen must not scroll the page underneath it.
//! Several gestures may want scrolling off at once (a drag that starts while
//! a resize is settling), so the lock is counted: the first
//! [`acquire`](ScrollLock::acquire) disables page scrolling and the last
//! [`release`](ScrollLock::release) re-enables it.
//!
//! # Invariants
//!
//! 1. `depth()` equals the number of outstanding [`ScrollToken`]s issued by
//!    this lock.
//! 2. Page scrolling is disabled iff `depth() > 0`.
//! 3. A token is released at most once: release consumes it and tokens are
//!    not `Clone`.

use std::sync::atomic::{AtomicU64, Ordering};

use planboard_core::InputHost;

static NEXT_LOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Proof of one scroll lock acquisition. Hand it back to
/// [`ScrollLock::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a scroll token that is never released keeps page scrolling disabled"]
pub struct ScrollToken {
    lock: u64,
}

/// Counted page scroll lock.
#[derive(Debug)]
pub struct ScrollLock {
    id: u64,
    depth: usize,
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollLock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed),
            depth: 0,
        }
    }

    /// Take a reference; disables page scrolling on the first one.
    pub fn acquire(&mut self, host: &mut dyn InputHost) -> ScrollToken {
        if self.depth == 0 {
            host.set_page_scroll(false);
        }
        self.depth += 1;
        tracing::trace!(target: "planboard.coordinator", depth = self.depth, "scroll lock acquired");
        ScrollToken { lock: self.id }
    }

    /// Return a reference; re-enables page scrolling on the last one.
    /// Tokens from another lock are ignored.
    pub fn release(&mut self, token: ScrollToken, host: &mut dyn InputHost) {
        if token.lock != self.id || self.depth == 0 {
            tracing::warn!(target: "planboard.coordinator", "ignoring foreign scroll token");
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            host.set_page_scroll(true);
        }
        tracing::trace!(target: "planboard.coordinator", depth = self.depth, "scroll lock released");
    }

    /// Outstanding acquisitions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }
}
