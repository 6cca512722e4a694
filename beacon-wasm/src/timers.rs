//! `setInterval` timer backend

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use beacon_core::{BeaconError, Result, TimerBackend, TimerEvent};
use tracing::trace;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::describe;
use crate::handle::TrackerSlot;

struct Interval {
    handle: i32,
    callback: Closure<dyn FnMut()>,
}

/// Repeating timers backed by `window.setInterval`
///
/// A fired interval calls [`beacon_core::Tracker::on_timer`] through the
/// slot. Cancelling from inside that call is allowed: the closure is retired
/// rather than dropped while it may still be on the stack.
pub struct IntervalTimerBackend {
    window: Window,
    slot: TrackerSlot,
    active: RefCell<HashMap<String, Interval>>,
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl IntervalTimerBackend {
    pub fn new(window: Window, slot: TrackerSlot) -> Self {
        Self {
            window,
            slot,
            active: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
        }
    }
}

impl TimerBackend for IntervalTimerBackend {
    fn schedule_repeating(&self, id: &str, interval: Duration, event: TimerEvent) -> Result<()> {
        self.cancel(id)?;

        let slot = self.slot.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            trace!(?event, "interval fired");
            slot.with(|tracker| tracker.on_timer(event));
        });

        let millis = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|e| BeaconError::Timer(describe(&e)))?;

        self.active
            .borrow_mut()
            .insert(id.to_string(), Interval { handle, callback });
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<bool> {
        let Some(interval) = self.active.borrow_mut().remove(id) else {
            return Ok(false);
        };
        self.window.clear_interval_with_handle(interval.handle);
        self.retired.borrow_mut().push(interval.callback);
        Ok(true)
    }

    fn exists(&self, id: &str) -> bool {
        self.active.borrow().contains_key(id)
    }

    fn name(&self) -> &'static str {
        "interval"
    }
}
