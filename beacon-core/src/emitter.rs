//! Event emitter
//!
//! Stamps an event with the current time, wraps it with the identity pair
//! and hands it to the transport. One event per payload.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::event::{Event, EventKind, Payload};
use crate::identity::Identity;
use crate::transport::Transport;

/// Emitter counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Payloads handed to the transport
    pub sent: u64,
    /// Events dropped because their data could not be serialized
    pub dropped: u64,
}

/// Sends single-event payloads for one page session
pub struct EventEmitter {
    identity: Identity,
    transport: Rc<dyn Transport>,
    clock: Rc<dyn Clock>,
    stats: Cell<EmitterStats>,
}

impl EventEmitter {
    pub fn new(identity: Identity, transport: Rc<dyn Transport>, clock: Rc<dyn Clock>) -> Self {
        Self {
            identity,
            transport,
            clock,
            stats: Cell::new(EmitterStats::default()),
        }
    }

    /// Send one event with arbitrary JSON data
    pub fn send_event(&self, kind: EventKind, data: Value) {
        let event = Event::new(kind, self.clock.now(), data);
        let payload = Payload::single(&self.identity, event);

        debug!(event = %kind, transport = self.transport.name(), "emitting event");
        self.transport.send(&payload);

        let mut stats = self.stats.get();
        stats.sent += 1;
        self.stats.set(stats);
    }

    /// Send one event with typed data
    pub fn emit<T: Serialize>(&self, kind: EventKind, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.send_event(kind, value),
            Err(e) => {
                warn!(event = %kind, "dropping event with unserializable data: {}", e);
                let mut stats = self.stats.get();
                stats.dropped += 1;
                self.stats.set(stats);
            }
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats.get()
    }
}
