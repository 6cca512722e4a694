//! # Timers
//!
//! The tracker schedules a single repeating timer (the engagement poll)
//! through the [`TimerBackend`] seam. The backend delivers fired timers back
//! to the tracker as [`TimerEvent`]s.
//!
//! ```text
//! Tracker ── schedule_repeating / cancel ──▶ TimerBackend
//!    ▲                                          │
//!    └───────────── on_timer(TimerEvent) ◀──────┘
//! ```
//!
//! - `MockTimerBackend`: records scheduled timers, tests fire them by hand
//! - `IntervalTimerBackend` (beacon-wasm): `window.setInterval`

mod mock;

use std::time::Duration;

use crate::error::Result;

pub use mock::{MockTimerBackend, RecordedTimer};

/// Timer events the tracker reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Evaluate the engagement heuristic
    EngagementPoll,
}

/// Abstract timer backend
pub trait TimerBackend {
    /// Schedule a repeating timer, replacing any timer with the same id
    fn schedule_repeating(&self, id: &str, interval: Duration, event: TimerEvent) -> Result<()>;

    /// Cancel a scheduled timer; `Ok(false)` if there was none
    fn cancel(&self, id: &str) -> Result<bool>;

    /// Check if an active timer exists
    fn exists(&self, id: &str) -> bool;

    /// Backend name (for logging)
    fn name(&self) -> &'static str;
}
