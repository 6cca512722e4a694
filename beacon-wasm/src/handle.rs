//! Weak handle from browser callbacks back to the tracker
//!
//! The adapters are built before the tracker they feed, so they share a slot
//! that is bound once the tracker exists. Callbacks never keep the tracker
//! alive and skip their work if it is gone or already borrowed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use beacon_core::Tracker;
use tracing::debug;

#[derive(Clone, Default)]
pub struct TrackerSlot {
    inner: Rc<RefCell<Weak<RefCell<Tracker>>>>,
}

impl TrackerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, tracker: &Rc<RefCell<Tracker>>) {
        *self.inner.borrow_mut() = Rc::downgrade(tracker);
    }

    /// Run `f` against the tracker if it is alive and not in use
    pub fn with<R>(&self, f: impl FnOnce(&mut Tracker) -> R) -> Option<R> {
        let tracker = self.inner.borrow().upgrade()?;
        let Ok(mut guard) = tracker.try_borrow_mut() else {
            debug!("tracker busy, dropping callback");
            return None;
        };
        let result = f(&mut guard);
        Some(result)
    }
}
