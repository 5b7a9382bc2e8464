//! Typed access to a [`DurableStore`] and the in-memory backend.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::DurableStore;
use crate::error::{LoadError, StoreError};

/// Keys the engine persists, before namespacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Scores,
    Streak,
    Settings,
}

impl StoreKey {
    pub const ALL: [Self; 3] = [Self::Scores, Self::Streak, Self::Settings];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scores => "scores",
            Self::Streak => "streak",
            Self::Settings => "settings",
        }
    }
}

/// Load and decode the payload under `key`.
///
/// # Errors
///
/// Returns [`LoadError::Missing`] when nothing is stored, [`LoadError::Corrupt`]
/// when the payload does not decode, and [`LoadError::Unavailable`] when the
/// backend cannot be read.
pub fn try_load<T, S>(store: &S, key: &str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    S: DurableStore + ?Sized,
{
    let payload = store
        .read_raw(key)?
        .ok_or_else(|| LoadError::Missing(key.to_string()))?;
    serde_json::from_str(&payload).map_err(|source| LoadError::Corrupt {
        key: key.to_string(),
        source,
    })
}

/// Load the payload under `key`, treating missing, corrupt and unreadable data as absent.
pub fn read<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: DurableStore + ?Sized,
{
    match try_load(store, key) {
        Ok(value) => Some(value),
        Err(LoadError::Missing(_)) => None,
        Err(err) => {
            warn!("Discarding stored payload: {err}");
            None
        }
    }
}

/// Serialize `value` as JSON and persist it under `key`.
///
/// # Errors
///
/// Returns an error if serialization fails or the backend rejects the write.
pub fn write<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: DurableStore + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    store.write_raw(key, &payload)
}

/// Volatile store backed by a shared map. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw payload under `key`, bypassing decoding.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store a raw payload, e.g. to simulate corrupt data.
    pub fn insert_raw(&self, key: impl Into<String>, payload: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), payload.into());
    }

    /// Make subsequent writes fail as a full or locked medium would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn write_raw(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        if self.reject_writes.get() {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.insert_raw(key, payload);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
