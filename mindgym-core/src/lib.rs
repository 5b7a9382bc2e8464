//! MindGym Progress Engine
//!
//! Platform-agnostic scoring and streak tracking for the MindGym mini-games.
//! Games report a [`GameCompleted`] outcome; the engine files it in a capped
//! per-game [`Ledger`], advances the daily [`StreakState`] and persists both
//! through a [`DurableStore`] supplied by the host.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod file_store;
pub mod ledger;
pub mod numbers;
pub mod record;
pub mod settings;
pub mod store;
pub mod streak;
pub mod tracker;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock, date_from_millis, midnight_millis};
pub use config::TrackerConfig;
pub use constants::{DEFAULT_KEY_PREFIX, DEFAULT_RECENT_DAYS, MILLIS_PER_DAY, SCORE_HISTORY_CAP};
pub use error::{ConfigError, LoadError, ParseDifficultyError, ProgressError, StoreError};
pub use file_store::FileStore;
pub use ledger::{GameStats, Ledger};
pub use record::{DatedEntry, Difficulty, GameCompleted, GameId, GameKind, ScoreRecord};
pub use settings::Settings;
pub use store::{MemoryStore, StoreKey};
pub use streak::{StreakState, StreakTransition, next_streak_state};
pub use tracker::{DailyActivity, DashboardSummary, GameSummary, ProgressTracker};

/// Trait for abstracting the host's local key-value persistence.
/// Platform-specific implementations should provide this.
///
/// Payloads are JSON text; typed access goes through [`store::try_load`],
/// [`store::read`] and [`store::write`].
pub trait DurableStore {
    /// Read the raw payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be read.
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `payload` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected (quota, permissions).
    fn write_raw(&self, key: &str, payload: &str) -> Result<(), StoreError>;

    /// Delete `key`; absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium rejects the deletion.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: DurableStore + ?Sized> DurableStore for &T {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read_raw(key)
    }

    fn write_raw(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        (**self).write_raw(key, payload)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
