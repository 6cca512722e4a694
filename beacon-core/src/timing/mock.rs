//! Mock timer backend for testing
//!
//! Records all scheduled timers for inspection in tests. Nothing fires on
//! its own; tests call `Tracker::on_timer` with the recorded event.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BeaconError, Result};
use crate::timing::{TimerBackend, TimerEvent};

/// Recorded timer
#[derive(Debug, Clone)]
pub struct RecordedTimer {
    pub id: String,
    pub interval: Duration,
    pub event: TimerEvent,
    pub cancelled: bool,
}

/// Mock timer backend that records scheduled timers
#[derive(Default)]
pub struct MockTimerBackend {
    timers: RefCell<HashMap<String, RecordedTimer>>,
    reject_schedules: bool,
}

impl MockTimerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `schedule_repeating` always fails
    pub fn rejecting() -> Self {
        Self {
            timers: RefCell::new(HashMap::new()),
            reject_schedules: true,
        }
    }

    pub fn get_timer(&self, id: &str) -> Option<RecordedTimer> {
        self.timers.borrow().get(id).cloned()
    }

    /// Count of timers ever scheduled (cancelled included)
    pub fn count(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn active_count(&self) -> usize {
        self.timers.borrow().values().filter(|t| !t.cancelled).count()
    }
}

impl TimerBackend for MockTimerBackend {
    fn schedule_repeating(&self, id: &str, interval: Duration, event: TimerEvent) -> Result<()> {
        if self.reject_schedules {
            return Err(BeaconError::Timer(format!("cannot schedule {}", id)));
        }
        self.timers.borrow_mut().insert(
            id.to_string(),
            RecordedTimer {
                id: id.to_string(),
                interval,
                event,
                cancelled: false,
            },
        );
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<bool> {
        let mut timers = self.timers.borrow_mut();
        match timers.get_mut(id) {
            Some(timer) if !timer.cancelled => {
                timer.cancelled = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn exists(&self, id: &str) -> bool {
        self.timers
            .borrow()
            .get(id)
            .map(|t| !t.cancelled)
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
