//! Time source for throttle deadlines.

use parking_lot::Mutex;
use std::fmt;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock monotonic time.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for replays and tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) -> Instant {
        let mut offset = self.offset.lock();
        *offset += by;
        self.origin + *offset
    }

    /// Move to `at`. Never moves backwards.
    pub fn advance_to(&self, at: Instant) -> Instant {
        let mut offset = self.offset.lock();
        let target = at.saturating_duration_since(self.origin);
        if target > *offset {
            *offset = target;
        }
        self.origin + *offset
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}
