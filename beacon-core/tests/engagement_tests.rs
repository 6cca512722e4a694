//! Engagement heuristic and feedback prompt tests

use std::rc::Rc;
use std::time::Duration;

use beacon_core::{
    BeaconConfig, ClickSnapshot, DomEvent, EngagementState, EventKind, KeyValueStore, MemoryStore,
    MockClock, MockEventSource, MockTimerBackend, PromptOutcome, RecordingPromptHost,
    RecordingTransport, Stores, TimerBackend, TimerEvent, Tracker, TrackerDeps,
    ENGAGEMENT_POLL_TIMER,
};
use serde_json::json;

struct Harness {
    store: Rc<MemoryStore>,
    transport: Rc<RecordingTransport>,
    clock: Rc<MockClock>,
    timers: Rc<MockTimerBackend>,
    host: Rc<RecordingPromptHost>,
    tracker: Tracker,
}

impl Harness {
    fn new(store: Rc<MemoryStore>) -> Self {
        Self::with_host(store, RecordingPromptHost::new())
    }

    fn with_host(store: Rc<MemoryStore>, host: RecordingPromptHost) -> Self {
        let transport = Rc::new(RecordingTransport::new());
        let clock = Rc::new(MockClock::at_epoch_2024());
        let timers = Rc::new(MockTimerBackend::new());
        let host = Rc::new(host);

        let deps = TrackerDeps {
            stores: Stores::new(store.clone()),
            transport: transport.clone(),
            clock: clock.clone(),
            timers: timers.clone(),
            source: Rc::new(MockEventSource::sample()),
            prompt_host: host.clone(),
        };
        let mut tracker = Tracker::new(BeaconConfig::default(), deps);
        tracker.start();

        Self {
            store,
            transport,
            clock,
            timers,
            host,
            tracker,
        }
    }

    fn click(&mut self) {
        self.tracker.dispatch(DomEvent::Click(ClickSnapshot {
            tag_name: "BUTTON".to_string(),
            ..ClickSnapshot::default()
        }));
    }

    /// Advance one poll interval and fire the poll if it is still scheduled
    fn tick(&mut self) {
        self.clock.advance(Duration::from_secs(1));
        if self.timers.exists(ENGAGEMENT_POLL_TIMER) {
            self.tracker.on_timer(TimerEvent::EngagementPoll);
        }
    }
}

#[test]
fn test_poll_is_scheduled_every_second() {
    let h = Harness::new(Rc::new(MemoryStore::new()));

    let timer = h.timers.get_timer(ENGAGEMENT_POLL_TIMER).unwrap();
    assert_eq!(timer.interval, Duration::from_secs(1));
    assert_eq!(timer.event, TimerEvent::EngagementPoll);
    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Idle));
}

#[test]
fn test_time_alone_does_not_trigger() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    h.click();

    for _ in 0..30 {
        h.tick();
    }

    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Idle));
    assert_eq!(h.host.shown_count(), 0);
}

#[test]
fn test_clicks_alone_do_not_trigger() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    for _ in 0..10 {
        h.click();
    }

    h.clock.advance(Duration::from_secs(3));
    h.tracker.on_timer(TimerEvent::EngagementPoll);

    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Idle));
    assert!(h.store.get("form_shown").unwrap().is_none());
}

#[test]
fn test_end_to_end_prompt_appears_once() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));

    // Clicks at t=1s and t=5s, polls every second
    for second in 1..=5 {
        h.clock.advance(Duration::from_secs(1));
        if second == 1 || second == 5 {
            h.click();
        }
        h.tracker.on_timer(TimerEvent::EngagementPoll);

        let expected = if second < 5 {
            EngagementState::Idle
        } else {
            EngagementState::Triggered
        };
        assert_eq!(h.tracker.engagement_state(), Some(expected), "t={}s", second);
    }

    assert_eq!(h.store.get("form_shown").unwrap().as_deref(), Some("true"));
    assert_eq!(h.host.shown_count(), 1);
    assert!(h.tracker.prompt_visible());
    assert!(!h.timers.exists(ENGAGEMENT_POLL_TIMER));

    // More clicks and stray polls change nothing
    for _ in 0..5 {
        h.click();
        h.clock.advance(Duration::from_secs(1));
        h.tracker.on_timer(TimerEvent::EngagementPoll);
    }
    assert_eq!(h.host.shown_count(), 1);
    assert_eq!(h.tracker.page().click_count, 7);
}

#[test]
fn test_preset_flag_never_triggers() {
    let store = Rc::new(MemoryStore::new());
    store.set("form_shown", "true").unwrap();
    let mut h = Harness::new(store);

    assert_eq!(h.timers.count(), 0);

    for _ in 0..10 {
        h.click();
        h.clock.advance(Duration::from_secs(1));
        h.tracker.on_timer(TimerEvent::EngagementPoll);
    }

    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Idle));
    assert_eq!(h.host.shown_count(), 0);
}

#[test]
fn test_prompt_fires_once_across_reloads() {
    let store = Rc::new(MemoryStore::new());

    let mut first = Harness::new(store.clone());
    first.click();
    first.click();
    for _ in 0..4 {
        first.tick();
    }
    assert_eq!(first.host.shown_count(), 1);

    let mut second = Harness::new(store);
    second.click();
    second.click();
    for _ in 0..10 {
        second.tick();
    }
    assert_eq!(second.host.shown_count(), 0);
    assert_eq!(second.tracker.engagement_state(), Some(EngagementState::Idle));
}

#[test]
fn test_empty_submit_keeps_prompt_open() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    h.click();
    h.click();
    for _ in 0..4 {
        h.tick();
    }
    assert!(h.tracker.prompt_visible());

    assert_eq!(h.tracker.submit_feedback(""), PromptOutcome::Empty);
    assert_eq!(h.tracker.submit_feedback(" \n\t"), PromptOutcome::Empty);

    assert!(h.transport.of_kind(EventKind::UserNeed).is_empty());
    assert!(h.tracker.prompt_visible());
    assert!(h.host.is_present());
}

#[test]
fn test_submit_sends_user_need() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    h.click();
    h.click();
    for _ in 0..4 {
        h.tick();
    }

    let outcome = h.tracker.submit_feedback("Where is the size guide?");

    assert_eq!(outcome, PromptOutcome::Submitted);
    let needs = h.transport.of_kind(EventKind::UserNeed);
    assert_eq!(needs.len(), 1);
    assert_eq!(
        needs[0].events[0].data,
        json!({"message": "Where is the size guide?"})
    );
    assert_eq!(needs[0].user_id, h.tracker.identity().user_id);
    assert!(!h.tracker.prompt_visible());
    assert!(!h.host.is_present());
    assert_eq!(h.host.confirmations(), vec!["Thanks for your feedback!"]);

    // A second submit has no prompt to act on
    assert_eq!(h.tracker.submit_feedback("again"), PromptOutcome::NotShown);
    assert_eq!(h.transport.of_kind(EventKind::UserNeed).len(), 1);
}

#[test]
fn test_close_removes_prompt_silently() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    h.click();
    h.click();
    for _ in 0..4 {
        h.tick();
    }
    let sent_before = h.transport.count();

    assert_eq!(h.tracker.close_prompt(), PromptOutcome::Closed);

    assert_eq!(h.transport.count(), sent_before);
    assert!(!h.host.is_present());
    assert!(!h.tracker.prompt_visible());
}

#[test]
fn test_failed_prompt_still_counts_as_shown() {
    let store = Rc::new(MemoryStore::new());
    let mut h = Harness::with_host(store.clone(), RecordingPromptHost::failing());
    h.click();
    h.click();
    for _ in 0..4 {
        h.tick();
    }

    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Triggered));
    assert!(!h.tracker.prompt_visible());
    assert_eq!(store.get("form_shown").unwrap().as_deref(), Some("true"));
    assert!(!h.timers.exists(ENGAGEMENT_POLL_TIMER));
}

#[test]
fn test_teardown_stops_polling() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    h.click();
    h.click();
    h.tracker.teardown();

    h.clock.advance(Duration::from_secs(10));
    h.tracker.on_timer(TimerEvent::EngagementPoll);

    assert!(!h.timers.exists(ENGAGEMENT_POLL_TIMER));
    assert_eq!(h.tracker.engagement_state(), Some(EngagementState::Idle));
    assert_eq!(h.host.shown_count(), 0);
}
