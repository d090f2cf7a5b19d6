//! Seek coalescing
//!
//! Scrubbing produces bursts of seek requests. Only the last request of a
//! burst should reach the transport, once no new request arrived for the
//! quiescence window. A single pending slot plus a wake time is enough: a
//! new request overwrites the slot and pushes the wake time back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSeek {
    /// Track-relative target in seconds
    target: f64,
    wake_at: Instant,
}

/// Trailing-edge debouncer for seek targets
#[derive(Debug, Clone)]
pub struct SeekDebouncer {
    window: Duration,
    pending: Option<PendingSeek>,
}

impl SeekDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Park a target, replacing any earlier one and restarting the window
    pub fn request(&mut self, target: f64, now: Instant) {
        self.pending = Some(PendingSeek {
            target,
            wake_at: now + self.window,
        });
    }

    /// Take the pending target once its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        match self.pending {
            Some(pending) if now >= pending.wake_at => {
                self.pending = None;
                Some(pending.target)
            }
            _ => None,
        }
    }

    /// Drop the pending target without issuing it
    pub fn cancel(&mut self) -> Option<f64> {
        self.pending.take().map(|p| p.target)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending target becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.wake_at)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
