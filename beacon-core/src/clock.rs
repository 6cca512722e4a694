//! Time sources
//!
//! Two readings are needed: wall-clock time for event timestamps and
//! identifier suffixes, and a monotonic "time since page load" for
//! time-on-page and the engagement heuristic.

use std::cell::Cell;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Clock seam
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed since the page started loading
    fn elapsed(&self) -> Duration;
}

/// Native clock backed by `chrono` and `std::time::Instant`
///
/// Not available on `wasm32`, where `Instant::now` has no time source; the
/// wasm bindings provide a `performance.now()` clock instead.
#[cfg(not(target_arch = "wasm32"))]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests
pub struct MockClock {
    now: Cell<DateTime<Utc>>,
    elapsed: Cell<Duration>,
}

impl MockClock {
    /// Start at the given wall-clock time with zero elapsed
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Start at 2024-01-01T00:00:00Z
    pub fn at_epoch_2024() -> Self {
        Self::new(DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }

    /// Move both readings forward
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
        let step = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        self.now.set(self.now.get() + step);
    }

    /// Jump to an absolute elapsed time (never backwards)
    pub fn set_elapsed(&self, elapsed: Duration) {
        if let Some(delta) = elapsed.checked_sub(self.elapsed.get()) {
            self.advance(delta);
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}
