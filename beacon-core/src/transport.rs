//! Transport seam
//!
//! Delivery is fire-and-forget: `send` never blocks, reports nothing back and
//! is never retried. The browser implementation is `navigator.sendBeacon`,
//! which survives page unload.

use std::cell::RefCell;

use crate::event::{EventKind, Payload};

/// Fire-and-forget payload sink
pub trait Transport {
    /// Hand a payload to the transport
    fn send(&self, payload: &Payload);

    /// Transport name (for logging)
    fn name(&self) -> &'static str;
}

/// Transport that keeps every payload for inspection in tests
#[derive(Default)]
pub struct RecordingTransport {
    sent: RefCell<Vec<Payload>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All payloads sent so far
    pub fn sent(&self) -> Vec<Payload> {
        self.sent.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }

    /// Payloads whose event is of the given kind
    pub fn of_kind(&self, kind: EventKind) -> Vec<Payload> {
        self.sent
            .borrow()
            .iter()
            .filter(|p| p.event().map(|e| e.kind) == Some(kind))
            .cloned()
            .collect()
    }

    /// Event kinds in send order
    pub fn kinds(&self) -> Vec<EventKind> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|p| p.event().map(|e| e.kind))
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, payload: &Payload) {
        self.sent.borrow_mut().push(payload.clone());
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
