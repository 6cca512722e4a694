//! # Beacon Core
//!
//! Client-side behavioral tracking for a single web page:
//!
//! - **Page views**: one `page_view` per load with URL, title, referrer and viewport
//! - **Clicks**: every click reaching the document, with target details and time on page
//! - **Scroll depth**: a `scroll_depth` event each time the visitor scrolls deeper
//! - **Engagement**: after enough time and clicks, a one-time feedback prompt whose
//!   answer is sent as `user_need`
//!
//! Every event is sent on its own, wrapped with the visitor's user and session
//! ids, through a fire-and-forget [`Transport`].
//!
//! ## Architecture
//!
//! ```text
//! EventSource ──DomEvent──▶ Tracker ──▶ Dispatcher ──▶ Listeners ──▶ EventEmitter ──▶ Transport
//!                              │                          │
//!                              │                     PageContext (clicks, max scroll)
//!                              │                          │
//! TimerBackend ──poll──▶ EngagementMonitor ◀──────────────┘
//!                              │
//!                              ▼
//!                       FeedbackPrompt ──▶ PromptHost
//! ```
//!
//! The browser implementations of the seams live in `beacon-wasm`; this crate
//! ships in-memory and recording implementations for tests.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use beacon_core::{
//!     BeaconConfig, MemoryStore, MockClock, MockEventSource, MockTimerBackend,
//!     RecordingPromptHost, RecordingTransport, Stores, Tracker, TrackerDeps,
//! };
//!
//! let transport = Rc::new(RecordingTransport::new());
//! let deps = TrackerDeps {
//!     stores: Stores::new(Rc::new(MemoryStore::new())),
//!     transport: transport.clone(),
//!     clock: Rc::new(MockClock::at_epoch_2024()),
//!     timers: Rc::new(MockTimerBackend::new()),
//!     source: Rc::new(MockEventSource::sample()),
//!     prompt_host: Rc::new(RecordingPromptHost::new()),
//! };
//!
//! let mut tracker = Tracker::new(BeaconConfig::default(), deps);
//! tracker.start();
//!
//! // The page view goes out as soon as tracking starts
//! assert_eq!(transport.count(), 1);
//! ```

pub mod clock;
pub mod config;
pub mod dom;
pub mod emitter;
pub mod engagement;
pub mod error;
pub mod event;
pub mod identity;
pub mod listeners;
pub mod page;
pub mod prompt;
pub mod storage;
pub mod timing;
pub mod tracker;
pub mod transport;

// Re-export main types
pub use clock::{Clock, MockClock};
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use config::{
    BeaconConfig, EngagementConfig, FeatureConfig, PromptConfig, SessionScope, StorageConfig,
    DEFAULT_ENDPOINT,
};
pub use dom::{
    ClickSnapshot, DomEvent, DomEventKind, EventSource, MockEventSource, PageSnapshot,
    ScrollSnapshot,
};
pub use emitter::{EmitterStats, EventEmitter};
pub use engagement::{EngagementMonitor, EngagementSample, EngagementState};
pub use error::{BeaconError, Result};
pub use event::{Event, EventKind, Payload, Viewport};
pub use identity::{generate_id, get_or_create_id, resolve_identity, Identity};
pub use page::PageContext;
pub use prompt::{FeedbackPrompt, PromptHost, PromptOutcome, RecordingPromptHost};
pub use storage::{DurableFlag, KeyValueStore, MemoryStore, Stores};
pub use timing::{MockTimerBackend, TimerBackend, TimerEvent};
pub use tracker::{Lifecycle, Tracker, TrackerDeps, ENGAGEMENT_POLL_TIMER};
pub use transport::{RecordingTransport, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
