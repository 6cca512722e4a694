//! DOM boundary
//!
//! Browser events arrive as plain snapshots of the DOM state the listeners
//! need, so listeners never touch the DOM and can be driven from tests.
//! An [`EventSource`] owns the real subscriptions and forwards snapshots to
//! `Tracker::dispatch`.

use std::cell::{Cell, RefCell};

use crate::error::{BeaconError, Result};
use crate::event::Viewport;

/// Kinds of DOM events a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    /// One-shot, produced by `EventSource::page` at start
    PageLoad,
    /// `click` on the document
    Click,
    /// `scroll` on the window
    Scroll,
}

/// Page state at load time
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    /// Empty when the visit had no referrer
    pub referrer: String,
    pub viewport: Viewport,
}

/// Click target and pointer state, as read from the DOM
///
/// Values are raw: the click listener does the normalizing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSnapshot {
    pub tag_name: String,
    pub id: String,
    pub class_list: Vec<String>,
    /// `None` when the target has no `innerText` (e.g. SVG)
    pub inner_text: Option<String>,
    pub href: Option<String>,
    pub client_x: i32,
    pub client_y: i32,
    pub scroll_y: f64,
}

/// Scroll geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_y: f64,
    pub scroll_height: f64,
    pub inner_height: f64,
}

/// A DOM event delivered to the listeners
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    PageLoad(PageSnapshot),
    Click(ClickSnapshot),
    Scroll(ScrollSnapshot),
}

impl DomEvent {
    pub fn kind(&self) -> DomEventKind {
        match self {
            DomEvent::PageLoad(_) => DomEventKind::PageLoad,
            DomEvent::Click(_) => DomEventKind::Click,
            DomEvent::Scroll(_) => DomEventKind::Scroll,
        }
    }
}

/// Source of DOM events
pub trait EventSource {
    /// Read the page state for the page view
    fn page(&self) -> Result<PageSnapshot>;

    /// Start delivering events of `kind` to the tracker
    fn subscribe(&self, kind: DomEventKind) -> Result<()>;

    /// Remove every subscription
    fn unsubscribe_all(&self);
}

/// Event source for tests: records subscriptions, events are dispatched by hand
pub struct MockEventSource {
    page: Option<PageSnapshot>,
    subscriptions: RefCell<Vec<DomEventKind>>,
    rejected: Option<DomEventKind>,
    unsubscribed: Cell<bool>,
}

impl MockEventSource {
    pub fn new(page: PageSnapshot) -> Self {
        Self {
            page: Some(page),
            subscriptions: RefCell::new(Vec::new()),
            rejected: None,
            unsubscribed: Cell::new(false),
        }
    }

    /// A source whose page cannot be read
    pub fn without_page() -> Self {
        Self {
            page: None,
            subscriptions: RefCell::new(Vec::new()),
            rejected: None,
            unsubscribed: Cell::new(false),
        }
    }

    /// A generic article page, 1280x720
    pub fn sample() -> Self {
        Self::new(PageSnapshot {
            url: "https://shop.example.com/products/42".to_string(),
            title: "Product 42".to_string(),
            referrer: String::new(),
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
        })
    }

    /// Fail every subscription to `kind`
    pub fn rejecting(mut self, kind: DomEventKind) -> Self {
        self.rejected = Some(kind);
        self
    }

    pub fn is_subscribed(&self, kind: DomEventKind) -> bool {
        self.subscriptions.borrow().contains(&kind)
    }

    pub fn subscriptions(&self) -> Vec<DomEventKind> {
        self.subscriptions.borrow().clone()
    }

    pub fn was_unsubscribed(&self) -> bool {
        self.unsubscribed.get()
    }
}

impl EventSource for MockEventSource {
    fn page(&self) -> Result<PageSnapshot> {
        self.page
            .clone()
            .ok_or_else(|| BeaconError::Dom("no document".to_string()))
    }

    fn subscribe(&self, kind: DomEventKind) -> Result<()> {
        if self.rejected == Some(kind) {
            return Err(BeaconError::Dom(format!("cannot listen for {:?}", kind)));
        }
        let mut subscriptions = self.subscriptions.borrow_mut();
        if !subscriptions.contains(&kind) {
            subscriptions.push(kind);
        }
        Ok(())
    }

    fn unsubscribe_all(&self) {
        self.subscriptions.borrow_mut().clear();
        self.unsubscribed.set(true);
    }
}
