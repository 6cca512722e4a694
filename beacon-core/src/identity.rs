//! Visitor identity
//!
//! A user id and a session id, each an opaque token of the form
//! `id_<random base-36><epoch millis>`, created on first access and stored
//! under a fixed key. Resolution never fails: if storage is unusable the
//! tracker runs with in-memory ids for the rest of the page session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{SessionScope, StorageConfig};
use crate::error::Result;
use crate::storage::{KeyValueStore, Stores};

/// Prefix of every generated identifier
pub const ID_PREFIX: &str = "id_";

/// Random bits in the base-36 fragment
const RANDOM_BITS: u32 = 52;

/// The identifier pair attached to every payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub session_id: String,
}

/// Generate a fresh identifier
pub fn generate_id(now_millis: i64) -> String {
    let random = (Uuid::new_v4().as_u128() as u64) & ((1u64 << RANDOM_BITS) - 1);
    format!("{}{}{}", ID_PREFIX, to_base36(random), now_millis)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Return the id stored under `key`, creating and persisting one if absent
///
/// An empty stored value counts as absent.
pub fn get_or_create_id(store: &dyn KeyValueStore, key: &str, clock: &dyn Clock) -> Result<String> {
    if let Some(existing) = store.get(key)?.filter(|v| !v.is_empty()) {
        return Ok(existing);
    }

    let id = generate_id(clock.now().timestamp_millis());
    store.set(key, &id)?;
    debug!(key, store = store.name(), "created identifier");
    Ok(id)
}

/// Resolve the identity for this page session
pub fn resolve_identity(stores: &Stores, config: &StorageConfig, clock: &dyn Clock) -> Identity {
    let user_id = resolve_one(stores.durable.as_ref(), &config.user_id_key, clock);

    let session_store = match (config.session_scope, &stores.tab) {
        (SessionScope::Tab, Some(tab)) => tab.as_ref(),
        (SessionScope::Tab, None) => {
            warn!("tab session scope requested but no per-tab store; using durable store");
            stores.durable.as_ref()
        }
        (SessionScope::Persistent, _) => stores.durable.as_ref(),
    };
    let session_id = resolve_one(session_store, &config.session_id_key, clock);

    Identity {
        user_id,
        session_id,
    }
}

fn resolve_one(store: &dyn KeyValueStore, key: &str, clock: &dyn Clock) -> String {
    get_or_create_id(store, key, clock).unwrap_or_else(|e| {
        warn!(key, store = store.name(), "storage unavailable, using in-memory id: {}", e);
        generate_id(clock.now().timestamp_millis())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_id(1_704_067_200_000);
        assert!(id.starts_with(ID_PREFIX));
        assert!(id.ends_with("1704067200000"));

        let fragment = &id[ID_PREFIX.len()..id.len() - "1704067200000".len()];
        assert!(!fragment.is_empty());
        assert!(fragment.len() <= 11);
        assert!(fragment
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_id(1), generate_id(1));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(46_655), "zzz");
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let store = MemoryStore::new();
        let clock = MockClock::at_epoch_2024();

        let first = get_or_create_id(&store, "tracking_user_id", &clock).unwrap();
        let second = get_or_create_id(&store, "tracking_user_id", &clock).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.get("tracking_user_id").unwrap(), Some(first));
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let store = MemoryStore::new();
        store.set("tracking_user_id", "id_existing").unwrap();
        let clock = MockClock::at_epoch_2024();

        let id = get_or_create_id(&store, "tracking_user_id", &clock).unwrap();
        assert_eq!(id, "id_existing");
    }

    #[test]
    fn test_empty_value_is_replaced() {
        let store = MemoryStore::new();
        store.set("tracking_user_id", "").unwrap();
        let clock = MockClock::at_epoch_2024();

        let id = get_or_create_id(&store, "tracking_user_id", &clock).unwrap();
        assert!(id.starts_with(ID_PREFIX));
    }

    #[test]
    fn test_get_or_create_propagates_storage_error() {
        let store = MemoryStore::failing();
        let clock = MockClock::at_epoch_2024();
        assert!(get_or_create_id(&store, "k", &clock).is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_memory() {
        let stores = Stores::new(Rc::new(MemoryStore::failing()));
        let clock = MockClock::at_epoch_2024();

        let identity = resolve_identity(&stores, &StorageConfig::default(), &clock);
        assert!(identity.user_id.starts_with(ID_PREFIX));
        assert!(identity.session_id.starts_with(ID_PREFIX));
        assert_ne!(identity.user_id, identity.session_id);
    }

    #[test]
    fn test_persistent_scope_uses_durable_store() {
        let durable = Rc::new(MemoryStore::new());
        let tab = Rc::new(MemoryStore::new());
        let stores = Stores::new(durable.clone()).with_tab(tab.clone());
        let clock = MockClock::at_epoch_2024();

        let identity = resolve_identity(&stores, &StorageConfig::default(), &clock);

        assert_eq!(
            durable.get("tracking_session_id").unwrap(),
            Some(identity.session_id)
        );
        assert!(tab.is_empty());
    }

    #[test]
    fn test_tab_scope_uses_tab_store() {
        let durable = Rc::new(MemoryStore::new());
        let tab = Rc::new(MemoryStore::new());
        let stores = Stores::new(durable.clone()).with_tab(tab.clone());
        let clock = MockClock::at_epoch_2024();
        let config = StorageConfig {
            session_scope: SessionScope::Tab,
            ..StorageConfig::default()
        };

        let identity = resolve_identity(&stores, &config, &clock);

        assert_eq!(tab.get("tracking_session_id").unwrap(), Some(identity.session_id));
        assert!(durable.get("tracking_session_id").unwrap().is_none());
        assert_eq!(durable.get("tracking_user_id").unwrap(), Some(identity.user_id));
    }

    #[test]
    fn test_tab_scope_without_tab_store() {
        let durable = Rc::new(MemoryStore::new());
        let stores = Stores::new(durable.clone());
        let clock = MockClock::at_epoch_2024();
        let config = StorageConfig {
            session_scope: SessionScope::Tab,
            ..StorageConfig::default()
        };

        let identity = resolve_identity(&stores, &config, &clock);
        assert_eq!(
            durable.get("tracking_session_id").unwrap(),
            Some(identity.session_id)
        );
    }
}
