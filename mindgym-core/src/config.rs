//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_KEY_PREFIX, DEFAULT_RECENT_DAYS, SCORE_HISTORY_CAP};
use crate::error::ConfigError;
use crate::store::StoreKey;

/// Tunables for [`crate::ProgressTracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Namespace prepended to every persisted key.
    pub key_prefix: String,
    /// Records retained per game.
    pub history_cap: usize,
    /// Default window for recent-score queries.
    pub recent_days: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            history_cap: SCORE_HISTORY_CAP,
            recent_days: DEFAULT_RECENT_DAYS,
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a JSON configuration; absent fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the history cap is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_cap == 0 {
            return Err(ConfigError::Invalid(
                "history_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fully qualified storage key.
    #[must_use]
    pub fn key(&self, key: StoreKey) -> String {
        format!("{}{}", self.key_prefix, key.name())
    }
}
