//! Settings persistence port: opaque key/value pairs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value as JsonValue;
use thiserror::Error;

use freshguard_events::Subscription;

use crate::settings::{DigestSettings, SettingsChanged};

pub const KEY_PUSH_ENABLED: &str = "pushEnabled";
pub const KEY_DIGEST_ENABLED: &str = "digestEnabled";
pub const KEY_DIGEST_HOUR: &str = "digestHour";
pub const KEY_DIGEST_MINUTE: &str = "digestMinute";

#[derive(Debug, Error)]
pub enum SettingsStoreError {
    #[error("settings store lock poisoned")]
    Poisoned,

    #[error("settings backend failure: {0}")]
    Backend(String),
}

/// Key/value storage for settings.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, SettingsStoreError>;
    fn set(&self, key: &str, value: JsonValue) -> Result<(), SettingsStoreError>;
}

impl<S> SettingsStore for Arc<S>
where
    S: SettingsStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<JsonValue>, SettingsStoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: JsonValue) -> Result<(), SettingsStoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<HashMap<String, JsonValue>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, SettingsStoreError> {
        let map = self.inner.read().map_err(|_| SettingsStoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: JsonValue) -> Result<(), SettingsStoreError> {
        let mut map = self.inner.write().map_err(|_| SettingsStoreError::Poisoned)?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}

/// Read settings, falling back per key when a value is missing or malformed.
pub fn load_settings<S: SettingsStore + ?Sized>(
    store: &S,
    fallback: DigestSettings,
) -> Result<DigestSettings, SettingsStoreError> {
    let push = read_bool(store, KEY_PUSH_ENABLED, fallback.push_enabled())?;
    let digest = read_bool(store, KEY_DIGEST_ENABLED, fallback.digest_enabled())?;
    let hour = read_u8(store, KEY_DIGEST_HOUR, fallback.hour())?;
    let minute = read_u8(store, KEY_DIGEST_MINUTE, fallback.minute())?;
    Ok(DigestSettings::new(push, digest, hour, minute))
}

pub fn save_settings<S: SettingsStore + ?Sized>(
    store: &S,
    settings: &DigestSettings,
) -> Result<(), SettingsStoreError> {
    store.set(KEY_PUSH_ENABLED, JsonValue::from(settings.push_enabled()))?;
    store.set(KEY_DIGEST_ENABLED, JsonValue::from(settings.digest_enabled()))?;
    store.set(KEY_DIGEST_HOUR, JsonValue::from(settings.hour()))?;
    store.set(KEY_DIGEST_MINUTE, JsonValue::from(settings.minute()))?;
    Ok(())
}

fn read_bool<S: SettingsStore + ?Sized>(store: &S, key: &str, fallback: bool) -> Result<bool, SettingsStoreError> {
    Ok(match store.get(key)? {
        None => fallback,
        Some(value) => value.as_bool().unwrap_or_else(|| {
            tracing::warn!(key, %value, "ignoring malformed setting");
            fallback
        }),
    })
}

fn read_u8<S: SettingsStore + ?Sized>(store: &S, key: &str, fallback: u8) -> Result<u8, SettingsStoreError> {
    Ok(match store.get(key)? {
        None => fallback,
        Some(value) => match value.as_u64() {
            Some(n) => u8::try_from(n).unwrap_or(u8::MAX),
            None => {
                tracing::warn!(key, %value, "ignoring malformed setting");
                fallback
            }
        },
    })
}

/// Listens for settings changes and writes the latest state to a store.
///
/// The newest state stays marked unsaved until a write of every key
/// succeeds, so a failed save is retried by the next [`SettingsPersister::sync`].
#[derive(Debug)]
pub struct SettingsPersister<S> {
    store: S,
    changes: Subscription<SettingsChanged>,
    unsaved: Mutex<Option<DigestSettings>>,
}

impl<S: SettingsStore> SettingsPersister<S> {
    pub fn new(store: S, changes: Subscription<SettingsChanged>) -> Self {
        Self {
            store,
            changes,
            unsaved: Mutex::new(None),
        }
    }

    /// Settings received but not yet written.
    pub fn unsaved(&self) -> Option<DigestSettings> {
        *self.unsaved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist the most recent state, retrying an earlier failed save.
    /// Returns how many queued changes this call consumed.
    pub fn sync(&self) -> Result<usize, SettingsStoreError> {
        let queued = self.changes.drain();
        let mut unsaved = self.unsaved.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = queued.last() {
            *unsaved = Some(last.settings);
        }

        if let Some(settings) = *unsaved {
            if let Err(err) = save_settings(&self.store, &settings) {
                tracing::warn!(error = %err, "digest settings not persisted; will retry");
                return Err(err);
            }
            *unsaved = None;
            tracing::debug!(changes = queued.len(), "persisted digest settings");
        }
        Ok(queued.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_restores_settings() {
        let store = InMemorySettingsStore::new();
        let settings = DigestSettings::new(true, true, 7, 45);
        save_settings(&store, &settings).unwrap();
        assert_eq!(load_settings(&store, DigestSettings::default()).unwrap(), settings);
        assert_eq!(store.get(KEY_DIGEST_HOUR).unwrap(), Some(JsonValue::from(7)));
    }

    #[test]
    fn missing_and_malformed_keys_fall_back() {
        let store = InMemorySettingsStore::new();
        store.set(KEY_PUSH_ENABLED, JsonValue::from(true)).unwrap();
        store.set(KEY_DIGEST_HOUR, JsonValue::from("seven")).unwrap();
        store.set(KEY_DIGEST_MINUTE, JsonValue::from(300)).unwrap();

        let loaded = load_settings(&store, DigestSettings::default()).unwrap();
        assert!(loaded.push_enabled());
        assert!(!loaded.digest_enabled());
        assert_eq!(loaded.hour(), 9);
        assert_eq!(loaded.minute(), 59);
    }

    /// Fails the first `n` writes, then behaves like the in-memory store.
    struct FlakyStore {
        failures_left: Mutex<u32>,
        inner: InMemorySettingsStore,
    }

    impl FlakyStore {
        fn failing(n: u32) -> Self {
            Self {
                failures_left: Mutex::new(n),
                inner: InMemorySettingsStore::new(),
            }
        }
    }

    impl SettingsStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<JsonValue>, SettingsStoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: JsonValue) -> Result<(), SettingsStoreError> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(SettingsStoreError::Backend("down".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn failed_save_is_retried_on_next_sync() {
        use chrono::Utc;
        use freshguard_events::{EventBus, InMemoryEventBus};

        let bus = InMemoryEventBus::<SettingsChanged>::new();
        let store = Arc::new(FlakyStore::failing(1));
        let persister = SettingsPersister::new(Arc::clone(&store), bus.subscribe());

        let armed = DigestSettings::new(true, true, 7, 0);
        bus.publish(SettingsChanged {
            previous: DigestSettings::default(),
            settings: armed,
            occurred_at: Utc::now(),
        })
        .unwrap();

        assert!(matches!(persister.sync(), Err(SettingsStoreError::Backend(_))));
        assert_eq!(persister.unsaved(), Some(armed));

        assert_eq!(persister.sync().unwrap(), 0);
        assert_eq!(persister.unsaved(), None);
        assert_eq!(load_settings(store.as_ref(), DigestSettings::default()).unwrap(), armed);
    }

    #[test]
    fn stored_digest_without_push_is_normalized() {
        let store = InMemorySettingsStore::new();
        store.set(KEY_DIGEST_ENABLED, JsonValue::from(true)).unwrap();
        let loaded = load_settings(&store, DigestSettings::default()).unwrap();
        assert!(!loaded.digest_enabled());
    }
}
