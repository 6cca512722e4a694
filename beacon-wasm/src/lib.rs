//! Page Beacon WebAssembly bindings via wasm-bindgen
//!
//! Runs the `beacon-core` tracker in the browser: identifiers live in
//! `localStorage`, events go out with `navigator.sendBeacon`, clicks and
//! scrolls come from DOM listeners and the engagement poll from
//! `setInterval`. Tracking stops when the page is unloaded; a page kept in
//! the back/forward cache resumes tracking when restored.
//!
//! ## Example
//!
//! ```javascript
//! import init, { Beacon, version } from '@page-beacon/wasm';
//!
//! async function main() {
//!   await init();
//!
//!   // Every field is optional
//!   const beacon = new Beacon(JSON.stringify({
//!     endpoint: "https://collect.example.com/track",
//!     features: { scroll_depth: true, engagement_prompt: true },
//!     log_level: "debug"
//!   }));
//!   beacon.start();
//!
//!   console.log("visitor:", beacon.user_id, "session:", beacon.session_id);
//!   console.log("beacon version:", version());
//! }
//!
//! main();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::PageTransitionEvent;

use beacon_core::{
    BeaconConfig, EngagementState, KeyValueStore, MemoryStore, PromptOutcome, SessionScope,
    Stores, Tracker, TrackerDeps,
};

mod clock;
mod dom;
mod handle;
pub mod logging;
mod prompt;
mod storage;
mod timers;
mod transport;

pub use clock::PerformanceClock;
pub use dom::DomEventSource;
pub use handle::TrackerSlot;
pub use prompt::DomPromptHost;
pub use storage::WebStorage;
pub use timers::IntervalTimerBackend;
pub use transport::BeaconTransport;

// Set up panic hook for better error messages
#[cfg(feature = "console_error_panic_hook")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Human-readable form of a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Page tracker for JavaScript
#[wasm_bindgen]
pub struct Beacon {
    tracker: Rc<RefCell<Tracker>>,
}

#[wasm_bindgen]
impl Beacon {
    /// Create a tracker from an optional JSON config
    ///
    /// Resolves the visitor identity immediately; nothing is sent until
    /// `start` is called.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Beacon, JsError> {
        let config = match config_json {
            Some(json) => BeaconConfig::from_json(&json)
                .map_err(|e| JsError::new(&format!("Invalid beacon config: {}", e)))?,
            None => BeaconConfig::default(),
        };
        logging::init(&config.log_level);

        let window = web_sys::window().ok_or_else(|| JsError::new("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("No document available"))?;

        let slot = TrackerSlot::new();
        let deps = TrackerDeps {
            stores: stores(&window, config.storage.session_scope),
            transport: Rc::new(BeaconTransport::new(
                window.navigator(),
                config.endpoint.clone(),
            )),
            clock: Rc::new(PerformanceClock::new(window.performance())),
            timers: Rc::new(IntervalTimerBackend::new(window.clone(), slot.clone())),
            source: Rc::new(DomEventSource::new(
                window.clone(),
                document.clone(),
                slot.clone(),
            )),
            prompt_host: Rc::new(DomPromptHost::new(window.clone(), document, slot.clone())),
        };

        let tracker = Rc::new(RefCell::new(Tracker::new(config, deps)));
        slot.bind(&tracker);
        watch_pagehide(&window, slot)?;

        Ok(Beacon { tracker })
    }

    /// Send the page view and begin tracking
    ///
    /// Parts of the page that cannot be tracked are logged and skipped.
    #[wasm_bindgen]
    pub fn start(&self) -> Result<(), JsError> {
        self.tracker
            .try_borrow_mut()
            .map_err(|_| JsError::new("Beacon is busy"))?
            .start();
        Ok(())
    }

    /// Stop tracking and remove every listener
    #[wasm_bindgen]
    pub fn teardown(&self) {
        if let Ok(mut tracker) = self.tracker.try_borrow_mut() {
            tracker.teardown();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn user_id(&self) -> String {
        self.tracker.borrow().identity().user_id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn session_id(&self) -> String {
        self.tracker.borrow().identity().session_id.clone()
    }

    /// Clicks recorded on this page
    #[wasm_bindgen(getter)]
    pub fn click_count(&self) -> u32 {
        self.tracker.borrow().page().click_count
    }

    /// Deepest scroll percentage reported on this page
    #[wasm_bindgen(getter)]
    pub fn max_scroll(&self) -> u32 {
        self.tracker.borrow().page().max_scroll
    }

    /// Whether the feedback prompt has fired on this page
    #[wasm_bindgen(getter)]
    pub fn engagement_triggered(&self) -> bool {
        self.tracker
            .borrow()
            .engagement_state()
            .is_some_and(|s| s == EngagementState::Triggered)
    }

    #[wasm_bindgen(getter)]
    pub fn events_sent(&self) -> f64 {
        self.tracker.borrow().emitter_stats().sent as f64
    }

    /// Submit feedback text as if typed into the prompt
    ///
    /// Returns "submitted", "empty" or "not_shown"
    #[wasm_bindgen]
    pub fn submit_feedback(&self, text: &str) -> Result<String, JsError> {
        let outcome = self
            .tracker
            .try_borrow_mut()
            .map_err(|_| JsError::new("Beacon is busy"))?
            .submit_feedback(text);
        outcome_name(outcome)
    }

    /// Dismiss the prompt without sending anything
    ///
    /// Returns "closed" or "not_shown"
    #[wasm_bindgen]
    pub fn close_prompt(&self) -> Result<String, JsError> {
        let outcome = self
            .tracker
            .try_borrow_mut()
            .map_err(|_| JsError::new("Beacon is busy"))?
            .close_prompt();
        outcome_name(outcome)
    }
}

impl Drop for Beacon {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Get the beacon version
#[wasm_bindgen]
pub fn version() -> String {
    beacon_core::VERSION.to_string()
}

fn outcome_name(outcome: PromptOutcome) -> Result<String, JsError> {
    serde_json::to_value(outcome)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| JsError::new("Failed to serialize outcome"))
}

fn stores(window: &web_sys::Window, scope: SessionScope) -> Stores {
    let durable: Rc<dyn KeyValueStore> = match WebStorage::local(window) {
        Ok(storage) => Rc::new(storage),
        Err(e) => {
            tracing::warn!("{}, identifiers will not persist", e);
            Rc::new(MemoryStore::new())
        }
    };

    match scope {
        SessionScope::Persistent => Stores::new(durable),
        SessionScope::Tab => match WebStorage::session(window) {
            Ok(tab) => Stores::new(durable).with_tab(Rc::new(tab)),
            Err(e) => {
                tracing::warn!("{}, falling back to durable session id", e);
                Stores::new(durable)
            }
        },
    }
}

fn watch_pagehide(window: &web_sys::Window, slot: TrackerSlot) -> Result<(), JsError> {
    let on_pagehide = Closure::<dyn FnMut(PageTransitionEvent)>::new(
        move |event: PageTransitionEvent| {
            slot.with(|tracker| tracker.on_page_hide(event.persisted()));
        },
    );
    window
        .add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())
        .map_err(|e| JsError::new(&format!("Failed to watch pagehide: {}", describe(&e))))?;
    on_pagehide.forget();
    Ok(())
}
