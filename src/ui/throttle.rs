//! Trailing-edge throttle driven by host ticks.
//!
//! The first trigger arms a window; every further trigger inside that window
//! is absorbed. Once the window has elapsed, the next [`poll`] reports the
//! single coalesced execution and disarms. There is never a leading call.
//!
//! [`poll`]: TrailingThrottle::poll

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TrailingThrottle {
    window: Duration,
    armed_at: Option<Instant>,
    absorbed: u32,
}

impl TrailingThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
            absorbed: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a trigger. Returns `true` when this trigger armed a new window.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.armed_at.is_some() {
            self.absorbed = self.absorbed.saturating_add(1);
            return false;
        }
        self.armed_at = Some(now);
        self.absorbed = 0;
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed_at.map(|armed| armed + self.window)
    }

    pub fn is_pending(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Triggers folded into the pending execution beyond the arming one.
    pub fn absorbed(&self) -> u32 {
        self.absorbed
    }

    /// Returns `true` exactly once per armed window, once `now` reaches the
    /// deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.armed_at {
            Some(armed) if now.saturating_duration_since(armed) >= self.window => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending execution. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.absorbed = 0;
        self.armed_at.take().is_some()
    }
}
