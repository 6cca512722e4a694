//! Per-page-session state
//!
//! Created when the tracker starts, dropped with it. Nothing here survives a
//! reload; the only cross-reload state is the durable `form_shown` flag.

use std::time::Duration;

/// Mutable state shared by the listeners and the engagement heuristic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Clock reading when tracking started
    pub active_start: Duration,

    /// Clicks seen on this page
    pub click_count: u32,

    /// Deepest scroll percentage emitted so far
    pub max_scroll: u32,
}

impl PageContext {
    pub fn new(active_start: Duration) -> Self {
        Self {
            active_start,
            click_count: 0,
            max_scroll: 0,
        }
    }

    /// Active time given the current clock reading
    pub fn active_time(&self, now: Duration) -> Duration {
        now.saturating_sub(self.active_start)
    }

    pub fn record_click(&mut self) {
        self.click_count = self.click_count.saturating_add(1);
    }

    /// Raise the running maximum; `false` if `percent` is not deeper
    pub fn record_scroll(&mut self, percent: u32) -> bool {
        if percent > self.max_scroll {
            self.max_scroll = percent;
            true
        } else {
            false
        }
    }
}
