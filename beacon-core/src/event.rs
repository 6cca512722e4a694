//! Event and payload types
//!
//! The wire format is what the collector reads:
//!
//! ```json
//! {
//!   "user_id": "id_k3j9x0a1b21704067200000",
//!   "session_id": "id_p0q9w8e7r61704067200000",
//!   "events": [
//!     { "type": "click", "timestamp": "2024-01-01T00:00:05.000Z", "data": { ... } }
//!   ]
//! }
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::Identity;

/// Kind of tracked event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PageView,
    Click,
    ScrollDepth,
    UserNeed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PageView => "page_view",
            EventKind::Click => "click",
            EventKind::ScrollDepth => "scroll_depth",
            EventKind::UserNeed => "user_need",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a timestamp the way `Date.prototype.toISOString` does
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// A single timestamped event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,

    pub data: Value,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>, data: Value) -> Self {
        Self {
            kind,
            timestamp,
            data,
        }
    }
}

/// The envelope sent to the collector
///
/// `events` is a list on the wire, but the emitter always sends exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub user_id: String,
    pub session_id: String,
    pub events: Vec<Event>,
}

impl Payload {
    /// Wrap one event with the identity pair
    pub fn single(identity: &Identity, event: Event) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            session_id: identity.session_id.clone(),
            events: vec![event],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The event carried by a single-event payload
    pub fn event(&self) -> Option<&Event> {
        self.events.first()
    }
}

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// `page_view` data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViewData {
    pub url: String,
    pub title: String,
    pub referrer: Option<String>,
    pub viewport: Viewport,
}

/// Pointer position in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// `click` data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    pub tag: String,
    pub id: Option<String>,
    #[serde(rename = "class")]
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub href: Option<String>,
    pub position: Position,
    /// Vertical scroll offset in pixels at click time
    pub scroll_position: i64,
    /// Seconds since page load, two decimals
    pub time_on_page: String,
}

/// `scroll_depth` data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollDepthData {
    pub scroll_depth_percentage: u32,
    pub timestamp: String,
}

/// `user_need` data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNeedData {
    pub message: String,
}
