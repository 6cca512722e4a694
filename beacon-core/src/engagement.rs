//! Engagement heuristic
//!
//! Two states, `Idle` and `Triggered`. On each poll the monitor moves to
//! `Triggered` once the visitor has been active for `min_active_secs` and
//! clicked at least `min_clicks` times, unless the durable `form_shown` flag
//! says the prompt was already shown in an earlier page load. `Triggered` is
//! terminal, and the durable flag makes it terminal across reloads too.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngagementConfig;
use crate::storage::DurableFlag;

/// Heuristic state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    Idle,
    Triggered,
}

/// Inputs for one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementSample {
    pub active_time: Duration,
    pub click_count: u32,
}

/// Engagement state machine
pub struct EngagementMonitor {
    config: EngagementConfig,
    form_shown: DurableFlag,
    state: EngagementState,
}

impl EngagementMonitor {
    pub fn new(config: EngagementConfig, form_shown: DurableFlag) -> Self {
        Self {
            config,
            form_shown,
            state: EngagementState::Idle,
        }
    }

    pub fn state(&self) -> EngagementState {
        self.state
    }

    /// The prompt was shown in an earlier page load
    pub fn already_shown(&self) -> bool {
        self.form_shown.is_set()
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Evaluate one poll; `true` exactly once, on the `Idle` → `Triggered` transition
    ///
    /// On transition the durable flag is written before returning.
    pub fn poll(&mut self, sample: EngagementSample) -> bool {
        if self.state == EngagementState::Triggered {
            return false;
        }
        if sample.active_time < self.config.min_active() || sample.click_count < self.config.min_clicks {
            return false;
        }
        if self.form_shown.is_set() {
            return false;
        }

        self.state = EngagementState::Triggered;
        self.form_shown.set();
        info!(
            clicks = sample.click_count,
            active_ms = sample.active_time.as_millis() as u64,
            "engagement threshold reached"
        );
        true
    }
}
