//! Browser implementations of the progress engine's platform traits.

use mindgym_core::numbers::millis_from_f64;
use mindgym_core::{Clock, DurableStore, StoreError};
use web_sys::Storage;

use crate::dom::{js_error_message, local_storage};

/// [`DurableStore`] backed by `window.localStorage`.
///
/// The handle is looked up on every call so the store can be constructed
/// before the page has finished loading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<Storage, StoreError> {
        local_storage().map_err(|err| StoreError::Unavailable(js_error_message(&err)))
    }
}

impl DurableStore for LocalStorageStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| StoreError::Unavailable(js_error_message(&err)))
    }

    fn write_raw(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, payload)
            .map_err(|err| StoreError::Write {
                key: key.to_string(),
                reason: js_error_message(&err),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| StoreError::Unavailable(js_error_message(&err)))
    }
}

/// [`Clock`] reading `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_millis(&self) -> i64 {
        millis_from_f64(js_sys::Date::now())
    }
}
