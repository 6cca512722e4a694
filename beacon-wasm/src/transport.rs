//! `navigator.sendBeacon` transport

use beacon_core::{Payload, Transport};
use tracing::{debug, warn};
use web_sys::Navigator;

use crate::describe;

/// Queues payloads with the browser's beacon API, which delivers them even
/// if the page is unloading. The browser reports only whether it accepted
/// the payload into its queue.
pub struct BeaconTransport {
    navigator: Navigator,
    endpoint: String,
}

impl BeaconTransport {
    pub fn new(navigator: Navigator, endpoint: impl Into<String>) -> Self {
        Self {
            navigator,
            endpoint: endpoint.into(),
        }
    }
}

impl Transport for BeaconTransport {
    fn send(&self, payload: &Payload) {
        let body = match payload.to_json() {
            Ok(body) => body,
            Err(e) => {
                warn!("failed to serialize payload: {}", e);
                return;
            }
        };

        match self.navigator.send_beacon_with_opt_str(&self.endpoint, Some(&body)) {
            Ok(true) => {}
            Ok(false) => debug!(endpoint = %self.endpoint, "browser refused to queue beacon"),
            Err(e) => warn!(endpoint = %self.endpoint, "sendBeacon failed: {}", describe(&e)),
        }
    }

    fn name(&self) -> &'static str {
        "beacon"
    }
}
