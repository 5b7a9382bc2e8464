//! Shared constants for the progress engine.

/// Maximum number of records retained per game.
pub const SCORE_HISTORY_CAP: usize = 100;

/// Window used by recent-score breakdowns when the caller does not pick one.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Prefix applied to every persisted key.
pub const DEFAULT_KEY_PREFIX: &str = "mindgym.";
