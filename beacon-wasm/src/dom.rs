//! Browser event source: reads the live DOM into snapshots

use std::cell::RefCell;

use beacon_core::{
    BeaconError, ClickSnapshot, DomEvent, DomEventKind, EventSource, PageSnapshot, Result,
    ScrollSnapshot, Viewport,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, MouseEvent, Window};

use crate::describe;
use crate::handle::TrackerSlot;

struct Subscription {
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Subscribes `click` on the document and `scroll` on the window
pub struct DomEventSource {
    window: Window,
    document: Document,
    slot: TrackerSlot,
    subscriptions: RefCell<Vec<Subscription>>,
    retired: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
}

impl DomEventSource {
    pub fn new(window: Window, document: Document, slot: TrackerSlot) -> Self {
        Self {
            window,
            document,
            slot,
            subscriptions: RefCell::new(Vec::new()),
            retired: RefCell::new(Vec::new()),
        }
    }

    fn listen(
        &self,
        target: EventTarget,
        event_type: &'static str,
        read: impl Fn(&Event) -> Option<DomEvent> + 'static,
    ) -> Result<()> {
        let slot = self.slot.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(snapshot) = read(&event) {
                slot.with(|tracker| tracker.dispatch(snapshot));
            }
        });

        target
            .add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())
            .map_err(|e| BeaconError::Dom(describe(&e)))?;

        self.subscriptions.borrow_mut().push(Subscription {
            target,
            event_type,
            callback,
        });
        Ok(())
    }
}

impl EventSource for DomEventSource {
    fn page(&self) -> Result<PageSnapshot> {
        let url = self
            .window
            .location()
            .href()
            .map_err(|e| BeaconError::Dom(describe(&e)))?;

        Ok(PageSnapshot {
            url,
            title: self.document.title(),
            referrer: self.document.referrer(),
            viewport: Viewport {
                width: as_pixels(self.window.inner_width()),
                height: as_pixels(self.window.inner_height()),
            },
        })
    }

    fn subscribe(&self, kind: DomEventKind) -> Result<()> {
        match kind {
            DomEventKind::PageLoad => Ok(()),
            DomEventKind::Click => {
                let window = self.window.clone();
                self.listen(self.document.clone().into(), "click", move |event| {
                    click_snapshot(&window, event).map(DomEvent::Click)
                })
            }
            DomEventKind::Scroll => {
                let window = self.window.clone();
                let document = self.document.clone();
                self.listen(self.window.clone().into(), "scroll", move |_| {
                    scroll_snapshot(&window, &document).map(DomEvent::Scroll)
                })
            }
        }
    }

    fn unsubscribe_all(&self) {
        let subscriptions: Vec<Subscription> = self.subscriptions.borrow_mut().drain(..).collect();
        for sub in subscriptions {
            let callback = sub.callback.as_ref().unchecked_ref();
            if let Err(e) = sub
                .target
                .remove_event_listener_with_callback(sub.event_type, callback)
            {
                warn!(event = sub.event_type, "failed to remove listener: {}", describe(&e));
            }
            self.retired.borrow_mut().push(sub.callback);
        }
        debug!("dom listeners removed");
    }
}

fn as_f64(value: std::result::Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn as_pixels(value: std::result::Result<JsValue, JsValue>) -> u32 {
    let pixels = as_f64(value);
    if pixels.is_finite() && pixels > 0.0 {
        pixels.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn click_snapshot(window: &Window, event: &Event) -> Option<ClickSnapshot> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    let element = event.target()?.dyn_into::<Element>().ok()?;

    let classes = element.class_list();
    let class_list = (0..classes.length()).filter_map(|i| classes.item(i)).collect();

    let href = js_sys::Reflect::get(&element, &JsValue::from_str("href"))
        .ok()
        .and_then(|v| v.as_string());

    Some(ClickSnapshot {
        tag_name: element.tag_name(),
        id: element.id(),
        class_list,
        inner_text: element.dyn_ref::<HtmlElement>().map(|el| el.inner_text()),
        href,
        client_x: mouse.client_x(),
        client_y: mouse.client_y(),
        scroll_y: window.scroll_y().unwrap_or(0.0),
    })
}

fn scroll_snapshot(window: &Window, document: &Document) -> Option<ScrollSnapshot> {
    let body = document.body()?;
    Some(ScrollSnapshot {
        scroll_y: window.scroll_y().unwrap_or(0.0),
        scroll_height: f64::from(body.scroll_height()),
        inner_height: as_f64(window.inner_height()),
    })
}
