//! `localStorage` / `sessionStorage` stores

use beacon_core::{BeaconError, KeyValueStore, Result};
use web_sys::{Storage, Window};

use crate::describe;

/// A Web Storage area
pub struct WebStorage {
    storage: Storage,
    name: &'static str,
}

impl WebStorage {
    /// `window.localStorage`
    pub fn local(window: &Window) -> Result<Self> {
        let storage = window
            .local_storage()
            .map_err(|e| BeaconError::Storage(describe(&e)))?
            .ok_or_else(|| BeaconError::Storage("localStorage is not available".to_string()))?;
        Ok(Self {
            storage,
            name: "localStorage",
        })
    }

    /// `window.sessionStorage`
    pub fn session(window: &Window) -> Result<Self> {
        let storage = window
            .session_storage()
            .map_err(|e| BeaconError::Storage(describe(&e)))?
            .ok_or_else(|| BeaconError::Storage("sessionStorage is not available".to_string()))?;
        Ok(Self {
            storage,
            name: "sessionStorage",
        })
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| BeaconError::Storage(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| BeaconError::Storage(describe(&e)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
