//! Key-value storage seam
//!
//! The browser exposes `localStorage` (durable) and `sessionStorage`
//! (per-tab). Both are string-to-string maps whose access can throw, e.g.
//! under private-browsing restrictions, so every call returns a [`Result`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::error::{BeaconError, Result};

/// String key-value store
///
/// All methods take `&self`; implementations use interior mutability.
pub trait KeyValueStore {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Store name (for logging)
    fn name(&self) -> &'static str;
}

/// The stores available to a tracker
#[derive(Clone)]
pub struct Stores {
    /// Survives reloads and browser restarts
    pub durable: Rc<dyn KeyValueStore>,

    /// Cleared when the tab closes, if the platform has one
    pub tab: Option<Rc<dyn KeyValueStore>>,
}

impl Stores {
    pub fn new(durable: Rc<dyn KeyValueStore>) -> Self {
        Self { durable, tab: None }
    }

    pub fn with_tab(mut self, tab: Rc<dyn KeyValueStore>) -> Self {
        self.tab = Some(tab);
        self
    }
}

/// In-memory store
///
/// Used in tests and as the degraded fallback when no browser storage exists.
/// Can be switched into a failing mode to simulate a store that throws.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every access fails
    pub fn failing() -> Self {
        let store = Self::new();
        store.failing.set(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every entry, like clearing site data
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn check(&self) -> Result<()> {
        if self.failing.get() {
            return Err(BeaconError::Storage("memory store access denied".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Boolean flag persisted as the string `"true"`
///
/// Read failures count as "unset"; write failures are logged and ignored.
pub struct DurableFlag {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl DurableFlag {
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn is_set(&self) -> bool {
        match self.store.get(&self.key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(key = %self.key, store = self.store.name(), "failed to read flag: {}", e);
                false
            }
        }
    }

    pub fn set(&self) {
        if let Err(e) = self.store.set(&self.key, "true") {
            warn!(key = %self.key, store = self.store.name(), "failed to persist flag: {}", e);
        }
    }
}
