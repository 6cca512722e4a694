//! The tracker
//!
//! One [`Tracker`] per page load. It owns the per-page state, the listeners,
//! the engagement heuristic and the prompt, and reaches the browser only
//! through the seams in [`TrackerDeps`].
//!
//! Lifecycle: `new` resolves the identity, `start` emits the page view,
//! subscribes the listeners and schedules the engagement poll, `teardown`
//! cancels timers and subscriptions. Events arriving outside `Running` are
//! ignored. Failures while starting degrade tracking, they never abort it.

use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::config::BeaconConfig;
use crate::dom::{DomEvent, DomEventKind, EventSource};
use crate::emitter::{EmitterStats, EventEmitter};
use crate::engagement::{EngagementMonitor, EngagementSample, EngagementState};
use crate::error::Result;
use crate::identity::{resolve_identity, Identity};
use crate::listeners::{ClickListener, Dispatcher, PageViewListener, ScrollDepthListener};
use crate::page::PageContext;
use crate::prompt::{FeedbackPrompt, PromptHost, PromptOutcome};
use crate::storage::{DurableFlag, Stores};
use crate::timing::{TimerBackend, TimerEvent};
use crate::transport::Transport;

/// Timer id of the engagement poll
pub const ENGAGEMENT_POLL_TIMER: &str = "beacon:engagement-poll";

/// Platform seams a tracker runs on
#[derive(Clone)]
pub struct TrackerDeps {
    pub stores: Stores,
    pub transport: Rc<dyn Transport>,
    pub clock: Rc<dyn Clock>,
    pub timers: Rc<dyn TimerBackend>,
    pub source: Rc<dyn EventSource>,
    pub prompt_host: Rc<dyn PromptHost>,
}

/// Tracker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    TornDown,
}

/// Per-page tracking context
pub struct Tracker {
    config: BeaconConfig,
    emitter: EventEmitter,
    page: PageContext,
    dispatcher: Dispatcher,
    engagement: Option<EngagementMonitor>,
    prompt: FeedbackPrompt,
    timers: Rc<dyn TimerBackend>,
    source: Rc<dyn EventSource>,
    prompt_host: Rc<dyn PromptHost>,
    lifecycle: Lifecycle,
}

impl Tracker {
    /// Create a tracker and resolve the visitor identity
    pub fn new(config: BeaconConfig, deps: TrackerDeps) -> Self {
        let identity = resolve_identity(&deps.stores, &config.storage, deps.clock.as_ref());
        let page = PageContext::new(deps.clock.elapsed());
        let emitter = EventEmitter::new(identity, deps.transport, deps.clock);

        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(PageViewListener));
        dispatcher.register(Box::new(ClickListener));
        if config.features.scroll_depth {
            dispatcher.register(Box::new(ScrollDepthListener));
        }

        let engagement = config.features.engagement_prompt.then(|| {
            EngagementMonitor::new(
                config.engagement.clone(),
                DurableFlag::new(deps.stores.durable.clone(), config.storage.form_shown_key.clone()),
            )
        });

        Self {
            config,
            emitter,
            page,
            dispatcher,
            engagement,
            prompt: FeedbackPrompt::new(),
            timers: deps.timers,
            source: deps.source,
            prompt_host: deps.prompt_host,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Emit the page view, subscribe listeners and schedule the engagement poll
    ///
    /// Calling `start` more than once is a no-op. Each step that fails is
    /// logged and skipped; the rest still run.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            debug!(lifecycle = ?self.lifecycle, "tracker already started");
            return;
        }
        self.lifecycle = Lifecycle::Running;
        self.page = PageContext::new(self.emitter.clock().elapsed());

        match self.source.page() {
            Ok(snapshot) => {
                self.dispatcher
                    .dispatch(&DomEvent::PageLoad(snapshot), &mut self.page, &self.emitter);
            }
            Err(e) => warn!("cannot read page state, skipping page view: {}", e),
        }

        for kind in self.dispatcher.kinds() {
            if kind == DomEventKind::PageLoad {
                continue;
            }
            if let Err(e) = self.source.subscribe(kind) {
                warn!(?kind, "failed to subscribe listener: {}", e);
            }
        }

        if let Err(e) = self.schedule_engagement_poll() {
            warn!(backend = self.timers.name(), "failed to schedule engagement poll: {}", e);
        }

        info!(
            user_id = %self.emitter.identity().user_id,
            scroll_depth = self.config.features.scroll_depth,
            engagement_prompt = self.config.features.engagement_prompt,
            "tracker started"
        );
    }

    fn schedule_engagement_poll(&self) -> Result<()> {
        let Some(monitor) = &self.engagement else {
            return Ok(());
        };
        if monitor.already_shown() {
            debug!("feedback prompt already shown, engagement poll not scheduled");
            return Ok(());
        }
        self.timers.schedule_repeating(
            ENGAGEMENT_POLL_TIMER,
            monitor.config().poll_interval(),
            TimerEvent::EngagementPoll,
        )
    }

    fn cancel_engagement_poll(&self) {
        match self.timers.cancel(ENGAGEMENT_POLL_TIMER) {
            Ok(true) => debug!(backend = self.timers.name(), "engagement poll cancelled"),
            Ok(false) => {}
            Err(e) => warn!("failed to cancel engagement poll: {}", e),
        }
    }

    /// Deliver a DOM event to the listeners; returns how many handled it
    pub fn dispatch(&mut self, event: DomEvent) -> usize {
        if self.lifecycle != Lifecycle::Running {
            trace!(lifecycle = ?self.lifecycle, "ignoring {:?} event", event.kind());
            return 0;
        }
        if event.kind() == DomEventKind::PageLoad {
            debug!("page view already recorded at start");
            return 0;
        }
        self.dispatcher.dispatch(&event, &mut self.page, &self.emitter)
    }

    /// Handle a fired timer
    pub fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::EngagementPoll => {
                self.poll_engagement();
            }
        }
    }

    /// Run one engagement poll; shows the prompt on the transition
    pub fn poll_engagement(&mut self) -> Option<EngagementState> {
        let running = self.lifecycle == Lifecycle::Running;
        let sample = EngagementSample {
            active_time: self.page.active_time(self.emitter.clock().elapsed()),
            click_count: self.page.click_count,
        };

        let monitor = self.engagement.as_mut()?;
        let triggered = running && monitor.poll(sample);
        let state = monitor.state();

        if triggered {
            if let Err(e) = self.prompt.open(self.prompt_host.as_ref(), &self.config.prompt) {
                warn!("failed to show feedback prompt: {}", e);
            }
            self.cancel_engagement_poll();
        }
        Some(state)
    }

    /// Submit the prompt text
    pub fn submit_feedback(&mut self, text: &str) -> PromptOutcome {
        self.prompt.submit(
            text,
            self.prompt_host.as_ref(),
            &self.emitter,
            &self.config.prompt,
        )
    }

    /// Dismiss the prompt
    pub fn close_prompt(&mut self) -> PromptOutcome {
        self.prompt.close(self.prompt_host.as_ref())
    }

    /// Handle `pagehide`
    ///
    /// A page entering the back/forward cache (`persisted`) is not unloaded
    /// and keeps tracking when restored; any other hide tears down.
    pub fn on_page_hide(&mut self, persisted: bool) {
        if persisted {
            debug!("page moved to back/forward cache, tracking kept");
            return;
        }
        self.teardown();
    }

    /// Stop tracking: cancel the poll and drop every subscription
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.cancel_engagement_poll();
        self.source.unsubscribe_all();
        self.lifecycle = Lifecycle::TornDown;
        info!(
            clicks = self.page.click_count,
            max_scroll = self.page.max_scroll,
            sent = self.emitter.stats().sent,
            "tracker torn down"
        );
    }

    pub fn identity(&self) -> &Identity {
        self.emitter.identity()
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `None` when the engagement prompt feature is off
    pub fn engagement_state(&self) -> Option<EngagementState> {
        self.engagement.as_ref().map(|m| m.state())
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt.is_visible()
    }

    pub fn emitter_stats(&self) -> EmitterStats {
        self.emitter.stats()
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }
}
