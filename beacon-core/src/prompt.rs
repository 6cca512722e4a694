//! Feedback prompt
//!
//! A floating form asking what the visitor is looking for. The tracker owns
//! the prompt's lifecycle; a [`PromptHost`] renders it.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PromptConfig;
use crate::emitter::EventEmitter;
use crate::error::{BeaconError, Result};
use crate::event::{EventKind, UserNeedData};

/// Renders the prompt
pub trait PromptHost {
    /// Insert the prompt into the page
    fn show(&self, copy: &PromptConfig) -> Result<()>;

    /// Remove the prompt from the page
    fn remove(&self);

    /// Tell the visitor their message was received
    fn confirm(&self, message: &str);
}

/// Result of a prompt action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOutcome {
    /// `user_need` emitted, prompt removed
    Submitted,
    /// Empty text, prompt left open
    Empty,
    /// Prompt removed without an event
    Closed,
    /// No prompt on screen
    NotShown,
}

/// Prompt lifecycle
#[derive(Debug, Default)]
pub struct FeedbackPrompt {
    visible: bool,
}

impl FeedbackPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the prompt; `Ok(false)` if it is already visible
    pub fn open(&mut self, host: &dyn PromptHost, copy: &PromptConfig) -> Result<bool> {
        if self.visible {
            return Ok(false);
        }
        host.show(copy)?;
        self.visible = true;
        debug!("feedback prompt shown");
        Ok(true)
    }

    /// Submit the visitor's text
    pub fn submit(
        &mut self,
        text: &str,
        host: &dyn PromptHost,
        emitter: &EventEmitter,
        copy: &PromptConfig,
    ) -> PromptOutcome {
        if !self.visible {
            warn!("submit without a visible prompt");
            return PromptOutcome::NotShown;
        }

        let message = text.trim();
        if message.is_empty() {
            return PromptOutcome::Empty;
        }

        emitter.emit(
            EventKind::UserNeed,
            &UserNeedData {
                message: message.to_string(),
            },
        );
        host.remove();
        self.visible = false;
        host.confirm(&copy.confirmation);
        PromptOutcome::Submitted
    }

    /// Dismiss the prompt
    pub fn close(&mut self, host: &dyn PromptHost) -> PromptOutcome {
        if !self.visible {
            return PromptOutcome::NotShown;
        }
        host.remove();
        self.visible = false;
        PromptOutcome::Closed
    }
}

/// Prompt host for tests
#[derive(Default)]
pub struct RecordingPromptHost {
    shown: Cell<usize>,
    removed: Cell<usize>,
    confirmations: RefCell<Vec<String>>,
    fail_show: bool,
}

impl RecordingPromptHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose `show` always fails
    pub fn failing() -> Self {
        Self {
            fail_show: true,
            ..Self::default()
        }
    }

    pub fn shown_count(&self) -> usize {
        self.shown.get()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.get()
    }

    /// Currently on screen
    pub fn is_present(&self) -> bool {
        self.shown.get() > self.removed.get()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.borrow().clone()
    }
}

impl PromptHost for RecordingPromptHost {
    fn show(&self, _copy: &PromptConfig) -> Result<()> {
        if self.fail_show {
            return Err(BeaconError::Dom("no document body".to_string()));
        }
        self.shown.set(self.shown.get() + 1);
        Ok(())
    }

    fn remove(&self) {
        self.removed.set(self.removed.get() + 1);
    }

    fn confirm(&self, message: &str) {
        self.confirmations.borrow_mut().push(message.to_string());
    }
}
