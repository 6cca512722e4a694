//! Configuration for the beacon
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! yields the stock tracker: local collector endpoint, scroll depth and the
//! engagement prompt both enabled, 4 s / 2 clicks thresholds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, Result};

/// Collector endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/track";

/// Main beacon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// URL the payloads are sent to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional behaviors
    #[serde(default)]
    pub features: FeatureConfig,

    /// Engagement heuristic thresholds
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Storage keys and session scope
    #[serde(default)]
    pub storage: StorageConfig,

    /// Feedback prompt copy
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Log filter directive (e.g. `info`, `beacon_core=debug`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool { true }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            features: FeatureConfig::default(),
            engagement: EngagementConfig::default(),
            storage: StorageConfig::default(),
            prompt: PromptConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl BeaconConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BeaconConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(BeaconError::Config("endpoint must not be empty".to_string()));
        }
        if self.engagement.poll_interval_ms == 0 {
            return Err(BeaconError::Config(
                "engagement.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        let keys = [
            &self.storage.user_id_key,
            &self.storage.session_id_key,
            &self.storage.form_shown_key,
        ];
        if keys.iter().any(|k| k.is_empty()) {
            return Err(BeaconError::Config("storage keys must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Feature flags replacing the two historical tracker variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Emit `scroll_depth` events
    #[serde(default = "default_true")]
    pub scroll_depth: bool,

    /// Run the engagement heuristic and show the feedback prompt
    #[serde(default = "default_true")]
    pub engagement_prompt: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            scroll_depth: true,
            engagement_prompt: true,
        }
    }
}

/// Engagement heuristic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Minimum active time on the page, in seconds
    #[serde(default = "default_min_active_secs")]
    pub min_active_secs: u64,

    /// Minimum number of clicks
    #[serde(default = "default_min_clicks")]
    pub min_clicks: u32,

    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_min_active_secs() -> u64 { 4 }
fn default_min_clicks() -> u32 { 2 }
fn default_poll_interval() -> u64 { 1000 }

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_active_secs: 4,
            min_clicks: 2,
            poll_interval_ms: 1000,
        }
    }
}

impl EngagementConfig {
    pub fn min_active(&self) -> Duration {
        Duration::from_secs(self.min_active_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Where the session identifier lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    /// Same durable store as the user identifier
    #[default]
    Persistent,
    /// Per-tab store, cleared when the tab closes
    Tab,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_user_id_key")]
    pub user_id_key: String,

    #[serde(default = "default_session_id_key")]
    pub session_id_key: String,

    /// Durable "prompt already shown" flag
    #[serde(default = "default_form_shown_key")]
    pub form_shown_key: String,

    #[serde(default)]
    pub session_scope: SessionScope,
}

fn default_user_id_key() -> String { "tracking_user_id".to_string() }
fn default_session_id_key() -> String { "tracking_session_id".to_string() }
fn default_form_shown_key() -> String { "form_shown".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            user_id_key: default_user_id_key(),
            session_id_key: default_session_id_key(),
            form_shown_key: default_form_shown_key(),
            session_scope: SessionScope::Persistent,
        }
    }
}

/// Text shown by the feedback prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_question")]
    pub question: String,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default = "default_submit_label")]
    pub submit_label: String,

    #[serde(default = "default_close_label")]
    pub close_label: String,

    /// Shown to the user after a successful submit
    #[serde(default = "default_confirmation")]
    pub confirmation: String,
}

fn default_question() -> String { "Can't find what you're looking for? Tell us what you need.".to_string() }
fn default_placeholder() -> String { "I'm looking for...".to_string() }
fn default_submit_label() -> String { "Send".to_string() }
fn default_close_label() -> String { "Close".to_string() }
fn default_confirmation() -> String { "Thanks for your feedback!".to_string() }

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            question: default_question(),
            placeholder: default_placeholder(),
            submit_label: default_submit_label(),
            close_label: default_close_label(),
            confirmation: default_confirmation(),
        }
    }
}
