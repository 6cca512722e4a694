//! Interaction listeners
//!
//! Each listener handles one [`DomEventKind`], turns the snapshot into event
//! data and emits it. The [`Dispatcher`] routes incoming events by kind.

mod click;
mod page_view;
mod scroll;

pub use click::{format_time_on_page, normalize_text, ClickListener, MAX_TEXT_CHARS};
pub use page_view::PageViewListener;
pub use scroll::{scroll_depth_percent, ScrollDepthListener};

use tracing::trace;

use crate::dom::{DomEvent, DomEventKind};
use crate::emitter::EventEmitter;
use crate::page::PageContext;

/// Handler for one kind of DOM event
pub trait Listener {
    /// Listener name (for logging)
    fn name(&self) -> &'static str;

    /// The event kind this listener handles
    fn kind(&self) -> DomEventKind;

    /// Handle an event of `self.kind()`
    fn on_event(&mut self, event: &DomEvent, page: &mut PageContext, emitter: &EventEmitter);
}

/// Routes DOM events to registered listeners
#[derive(Default)]
pub struct Dispatcher {
    listeners: Vec<Box<dyn Listener>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Distinct kinds with at least one listener, in registration order
    pub fn kinds(&self) -> Vec<DomEventKind> {
        let mut kinds = Vec::new();
        for listener in &self.listeners {
            let kind = listener.kind();
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Deliver an event; returns how many listeners handled it
    pub fn dispatch(&mut self, event: &DomEvent, page: &mut PageContext, emitter: &EventEmitter) -> usize {
        let kind = event.kind();
        let mut handled = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.kind() == kind) {
            trace!(listener = listener.name(), "dispatching {:?}", kind);
            listener.on_event(event, page, emitter);
            handled += 1;
        }
        handled
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::dom::ScrollSnapshot;
    use crate::identity::Identity;
    use crate::transport::RecordingTransport;
    use std::rc::Rc;

    fn emitter() -> (EventEmitter, Rc<RecordingTransport>) {
        let transport = Rc::new(RecordingTransport::new());
        let identity = Identity {
            user_id: "id_u".to_string(),
            session_id: "id_s".to_string(),
        };
        let emitter = EventEmitter::new(
            identity,
            transport.clone(),
            Rc::new(MockClock::at_epoch_2024()),
        );
        (emitter, transport)
    }

    #[test]
    fn test_kinds_are_distinct() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(PageViewListener));
        dispatcher.register(Box::new(ClickListener));
        dispatcher.register(Box::new(ClickListener));
        dispatcher.register(Box::new(ScrollDepthListener));

        assert_eq!(dispatcher.len(), 4);
        assert_eq!(
            dispatcher.kinds(),
            vec![DomEventKind::PageLoad, DomEventKind::Click, DomEventKind::Scroll]
        );
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(ClickListener));
        let (emitter, transport) = emitter();
        let mut page = PageContext::default();

        let scroll = DomEvent::Scroll(ScrollSnapshot {
            scroll_y: 100.0,
            scroll_height: 2000.0,
            inner_height: 1000.0,
        });
        assert_eq!(dispatcher.dispatch(&scroll, &mut page, &emitter), 0);
        assert_eq!(transport.count(), 0);
        assert_eq!(page.max_scroll, 0);
    }
}
