//! JavaScript-facing API consumed by the games and the dashboard.

use log::warn;
use mindgym_core::numbers::score_from_f64;
use mindgym_core::{
    Difficulty, ParseDifficultyError, ProgressError, ProgressTracker, Settings, StoreError,
    StreakTransition,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::storage::{BrowserClock, LocalStorageStore};

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Invalid score: {0} (expected a non-negative integer)")]
    Score(f64),
    #[error(transparent)]
    Difficulty(#[from] ParseDifficultyError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Conversion error: {0}")]
    Conversion(String),
}

impl From<BindingError> for JsValue {
    fn from(err: BindingError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Validate a score arriving as a JS number.
///
/// # Errors
/// Returns an error for negative, fractional or non-finite values.
pub fn parse_score(value: f64) -> Result<u32, BindingError> {
    score_from_f64(value).ok_or(BindingError::Score(value))
}

/// Parse an optional difficulty filter; an empty string means "any".
///
/// # Errors
/// Returns an error for unrecognised difficulty names.
pub fn parse_difficulty_filter(value: Option<&str>) -> Result<Option<Difficulty>, BindingError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => Ok(Some(name.parse()?)),
    }
}

/// JS-friendly label for a streak evaluation.
#[must_use]
pub const fn transition_label(transition: StreakTransition) -> &'static str {
    match transition {
        StreakTransition::AlreadyCounted => "already_counted",
        StreakTransition::Continued => "continued",
        StreakTransition::Restarted => "restarted",
        StreakTransition::Lapsed => "lapsed",
        StreakTransition::Grace => "grace",
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, BindingError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| BindingError::Conversion(err.to_string()))
}

/// Progress engine bound to `localStorage` and the browser clock.
#[wasm_bindgen]
pub struct MindGym {
    tracker: ProgressTracker<LocalStorageStore, BrowserClock>,
}

#[wasm_bindgen]
impl MindGym {
    /// Load the saved profile (or start a fresh one).
    ///
    /// A full or read-only `localStorage` still loads; writes fail later, per call.
    ///
    /// # Errors
    /// Returns an error if the tracker configuration is rejected.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        let tracker = ProgressTracker::load(LocalStorageStore, BrowserClock).map_err(|err| {
            warn!("Progress storage unavailable: {err}");
            BindingError::from(err)
        })?;
        Ok(Self { tracker })
    }

    /// Record a finished game and return the stored record.
    ///
    /// # Errors
    /// Returns an error for invalid input or when the result cannot be saved.
    #[wasm_bindgen(js_name = recordOutcome)]
    pub fn record_outcome(
        &mut self,
        game: &str,
        score: f64,
        difficulty: &str,
    ) -> Result<JsValue, JsValue> {
        let score = parse_score(score)?;
        let difficulty: Difficulty = difficulty.parse().map_err(BindingError::from)?;
        let record = self
            .tracker
            .record_outcome(game, score, difficulty)
            .map_err(|err| {
                crate::dom::console_error(&format!("Failed to record {game}: {err}"));
                BindingError::from(err)
            })?;
        Ok(to_js(&record)?)
    }

    /// # Errors
    /// Returns an error for an unrecognised difficulty.
    #[wasm_bindgen(js_name = bestScore)]
    pub fn best_score(&self, game: &str, difficulty: Option<String>) -> Result<u32, JsValue> {
        let filter = parse_difficulty_filter(difficulty.as_deref())?;
        Ok(self.tracker.best_score(game, filter))
    }

    #[wasm_bindgen(js_name = currentStreak)]
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.tracker.current_streak()
    }

    #[wasm_bindgen(js_name = todayCount)]
    #[must_use]
    pub fn today_count(&self) -> usize {
        self.tracker.today_count()
    }

    #[wasm_bindgen(js_name = totalCount)]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.tracker.total_count()
    }

    /// # Errors
    /// Returns an error if the stats cannot be converted to a JS object.
    #[wasm_bindgen(js_name = statsFor)]
    pub fn stats_for(&self, game: &str) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.tracker.stats_for(game))?)
    }

    /// # Errors
    /// Returns an error if the records cannot be converted to JS values.
    #[wasm_bindgen(js_name = scoresFor)]
    pub fn scores_for(&self, game: &str) -> Result<JsValue, JsValue> {
        Ok(to_js(self.tracker.scores_for(game))?)
    }

    /// # Errors
    /// Returns an error if the records cannot be converted to JS values.
    #[wasm_bindgen(js_name = todayScores)]
    pub fn today_scores(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.tracker.today_scores())?)
    }

    /// Records from the last `days` days (default: the configured window) keyed by `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns an error if the records cannot be converted to JS values.
    #[wasm_bindgen(js_name = recentScores)]
    pub fn recent_scores(&self, days: Option<u32>) -> Result<JsValue, JsValue> {
        let recent = days.map_or_else(
            || self.tracker.recent_scores_default(),
            |days| self.tracker.recent_scores(days),
        );
        Ok(to_js(&recent)?)
    }

    /// # Errors
    /// Returns an error if the rows cannot be converted to JS values.
    #[wasm_bindgen(js_name = dailyActivity)]
    pub fn daily_activity(&self, days: Option<u32>) -> Result<JsValue, JsValue> {
        let days = days.unwrap_or(self.tracker.config().recent_days);
        Ok(to_js(&self.tracker.daily_activity(days))?)
    }

    /// # Errors
    /// Returns an error if the summary cannot be converted to a JS object.
    pub fn dashboard(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.tracker.dashboard())?)
    }

    /// # Errors
    /// Returns an error if the settings cannot be converted to a JS object.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(self.tracker.settings())?)
    }

    /// # Errors
    /// Returns an error if `value` is not a settings object or cannot be saved.
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&mut self, value: JsValue) -> Result<(), JsValue> {
        let settings: Settings = serde_wasm_bindgen::from_value(value)
            .map_err(|err| BindingError::Conversion(err.to_string()))?;
        self.tracker
            .update_settings(settings)
            .map_err(BindingError::from)?;
        Ok(())
    }

    /// Re-evaluate the streak (e.g. when the page regains focus after midnight).
    ///
    /// # Errors
    /// Returns an error if the streak cannot be saved.
    #[wasm_bindgen(js_name = recomputeStreak)]
    pub fn recompute_streak(&mut self) -> Result<String, JsValue> {
        let transition = self
            .tracker
            .recompute_streak()
            .map_err(BindingError::from)?;
        Ok(transition_label(transition).to_string())
    }

    /// Clear all saved progress.
    ///
    /// # Errors
    /// Returns an error if `localStorage` rejects the reset.
    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&mut self) -> Result<(), JsValue> {
        self.tracker.reset_all().map_err(BindingError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_must_be_non_negative_integers() {
        assert_eq!(parse_score(450.0).unwrap(), 450);
        assert!(matches!(parse_score(-5.0), Err(BindingError::Score(_))));
        assert!(matches!(parse_score(2.5), Err(BindingError::Score(_))));
        assert!(matches!(parse_score(f64::NAN), Err(BindingError::Score(_))));
    }

    #[test]
    fn difficulty_filter_accepts_blank_as_any() {
        assert_eq!(parse_difficulty_filter(None).unwrap(), None);
        assert_eq!(parse_difficulty_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_difficulty_filter(Some("hard")).unwrap(),
            Some(Difficulty::Hard)
        );
        let err = parse_difficulty_filter(Some("extreme")).unwrap_err();
        assert!(err.to_string().contains("extreme"));
    }

    #[test]
    fn transition_labels_are_snake_case() {
        assert_eq!(transition_label(StreakTransition::Continued), "continued");
        assert_eq!(
            transition_label(StreakTransition::AlreadyCounted),
            "already_counted"
        );
    }
}
