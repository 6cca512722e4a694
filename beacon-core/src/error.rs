//! Error types for the beacon
//!
//! Every seam (storage, transport, timers, DOM) reports failures through
//! [`BeaconError`]. The tracker itself never lets one of these escape into
//! page code: it logs and degrades instead.

use thiserror::Error;

/// Result type alias for beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Errors that can occur while tracking
#[derive(Error, Debug)]
pub enum BeaconError {
    /// Durable or per-tab storage is unavailable or rejected the access
    #[error("Storage error: {0}")]
    Storage(String),

    /// The payload could not be handed to the transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Timer could not be scheduled or cancelled
    #[error("Timer error: {0}")]
    Timer(String),

    /// DOM access failed
    #[error("DOM error: {0}")]
    Dom(String),
}

impl BeaconError {
    /// Stable error code, suitable for console output and tests
    pub fn code(&self) -> &'static str {
        match self {
            BeaconError::Storage(_) => "STORAGE_UNAVAILABLE",
            BeaconError::Transport(_) => "TRANSPORT_FAILED",
            BeaconError::Serialization(_) => "SERIALIZATION_FAILED",
            BeaconError::Config(_) => "INVALID_CONFIG",
            BeaconError::Timer(_) => "TIMER_FAILED",
            BeaconError::Dom(_) => "DOM_UNAVAILABLE",
        }
    }
}
