//! Page view

use crate::dom::{DomEvent, DomEventKind};
use crate::emitter::EventEmitter;
use crate::event::{EventKind, PageViewData};
use crate::listeners::Listener;
use crate::page::PageContext;

/// Emits `page_view` from the load-time snapshot
pub struct PageViewListener;

impl Listener for PageViewListener {
    fn name(&self) -> &'static str {
        "page_view"
    }

    fn kind(&self) -> DomEventKind {
        DomEventKind::PageLoad
    }

    fn on_event(&mut self, event: &DomEvent, _page: &mut PageContext, emitter: &EventEmitter) {
        let DomEvent::PageLoad(snapshot) = event else {
            return;
        };

        let data = PageViewData {
            url: snapshot.url.clone(),
            title: snapshot.title.clone(),
            referrer: (!snapshot.referrer.is_empty()).then(|| snapshot.referrer.clone()),
            viewport: snapshot.viewport,
        };
        emitter.emit(EventKind::PageView, &data);
    }
}
