//! Coalescing of rapid-fire refresh triggers into a single effect.
//!
//! Several coverage-affecting events can fire back to back (a report file
//! rewritten repeatedly during a test run, fast typing invalidating
//! annotations). Pushing a visible update for each would flicker, so
//! triggers within a window collapse into one, and the *last* triggering
//! input within the window is the one applied.
//!
//! The primitive is deliberately pollable rather than timer-driven: the
//! core is single-threaded, so the host pumps [`Coalescer::poll`] from its
//! tick loop and tests drive it with explicit instants.

use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_millis(100);

/// Collapses triggers within a window into one pending effect.
#[derive(Debug)]
pub struct Coalescer<T> {
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Coalescer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Record an input and restart the window. A later trigger replaces an
    /// earlier pending one.
    pub fn trigger(&mut self, input: T, now: Instant) {
        self.pending = Some(input);
        self.deadline = Some(now + self.window);
    }

    /// Take the pending input once the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Take the pending input immediately, regardless of the window.
    /// Used on teardown so a queued refresh is not silently dropped.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_WINDOW)
    }
}
