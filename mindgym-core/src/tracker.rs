//! Progress facade: the write path for finished games and the read side
//! dashboards and game-end screens query.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::DurableStore;
use crate::clock::{Clock, date_from_millis};
use crate::config::TrackerConfig;
use crate::error::{ProgressError, StoreError};
use crate::ledger::{GameStats, Ledger};
use crate::numbers::days_to_millis;
use crate::record::{DatedEntry, Difficulty, GameCompleted, GameId, GameKind, ScoreRecord};
use crate::settings::Settings;
use crate::store::{self, StoreKey};
use crate::streak::{StreakState, StreakTransition};

/// Plays recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub plays: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game: GameId,
    pub label: String,
    #[serde(flatten)]
    pub stats: GameStats,
}

/// Everything the dashboard shows in one read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub streak: u32,
    pub today_count: usize,
    pub total_count: usize,
    pub games: Vec<GameSummary>,
}

/// Owns the ledger, streak and settings for one player profile.
///
/// State is loaded from the store by [`ProgressTracker::load`] and written
/// back after every mutation.
pub struct ProgressTracker<S, C>
where
    S: DurableStore,
    C: Clock,
{
    store: S,
    clock: C,
    config: TrackerConfig,
    ledger: Ledger,
    streak: StreakState,
    settings: Settings,
}

impl<S, C> ProgressTracker<S, C>
where
    S: DurableStore,
    C: Clock,
{
    /// Load the profile with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::load_with_config`].
    pub fn load(store: S, clock: C) -> Result<Self, ProgressError> {
        Self::load_with_config(store, clock, TrackerConfig::default())
    }

    /// Load the profile; missing or corrupt payloads start from defaults.
    ///
    /// A failed startup write (trimmed ledger or re-evaluated streak) is logged
    /// and the loaded state is kept, so existing scores stay readable.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Config`] if `config` is out of range.
    pub fn load_with_config(
        store: S,
        clock: C,
        config: TrackerConfig,
    ) -> Result<Self, ProgressError> {
        config.validate()?;
        let mut tracker = Self {
            store,
            clock,
            config,
            ledger: Ledger::new(),
            streak: StreakState::default(),
            settings: Settings::default(),
        };
        if let Err(err) = tracker.initialize() {
            warn!("Startup progress write failed, continuing with loaded state: {err}");
        }
        Ok(tracker)
    }

    fn initialize(&mut self) -> Result<(), StoreError> {
        self.ledger = store::read(&self.store, &self.key(StoreKey::Scores)).unwrap_or_default();
        self.streak = store::read(&self.store, &self.key(StoreKey::Streak)).unwrap_or_default();
        self.settings = store::read(&self.store, &self.key(StoreKey::Settings)).unwrap_or_default();

        let evicted = self.ledger.enforce_cap(self.config.history_cap);
        self.advance_streak();
        if evicted > 0 {
            debug!("Evicted {evicted} records above the history cap on load");
            self.persist_ledger()?;
        }
        self.persist_streak()
    }

    fn key(&self, key: StoreKey) -> String {
        self.config.key(key)
    }

    /// Record a finished game. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidArgument`] for a blank game id and
    /// [`ProgressError::Store`] when the ledger or streak cannot be persisted.
    /// A rejected write leaves the record in memory; [`Self::persist`] retries.
    pub fn record_outcome(
        &mut self,
        game: impl Into<GameId>,
        score: u32,
        difficulty: Difficulty,
    ) -> Result<ScoreRecord, ProgressError> {
        let game = game.into();
        if game.is_blank() {
            return Err(ProgressError::InvalidArgument(
                "game id must not be empty".to_string(),
            ));
        }

        let now = self.clock.now_millis();
        let record = ScoreRecord {
            score,
            difficulty,
            date: date_from_millis(now),
            timestamp: now,
        };
        let evicted = self
            .ledger
            .append(game.clone(), record.clone(), self.config.history_cap);
        debug!("Recorded {game} score {score} ({difficulty}); evicted {evicted}");

        self.advance_streak();
        self.persist_ledger()?;
        self.persist_streak()?;
        Ok(record)
    }

    /// Event form of [`Self::record_outcome`].
    ///
    /// # Errors
    ///
    /// See [`Self::record_outcome`].
    pub fn record(&mut self, event: GameCompleted) -> Result<ScoreRecord, ProgressError> {
        self.record_outcome(event.game, event.score, event.difficulty)
    }

    /// Re-evaluate the streak against today's activity and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the streak cannot be persisted.
    pub fn recompute_streak(&mut self) -> Result<StreakTransition, StoreError> {
        let transition = self.advance_streak();
        self.persist_streak().map(|()| transition)
    }

    /// Apply today's streak transition in memory only.
    fn advance_streak(&mut self) -> StreakTransition {
        let today = self.clock.today();
        let played_today = self.ledger.played_on(today);
        let transition = StreakTransition::classify(&self.streak, today, played_today);
        self.streak = transition.apply(self.streak, today);
        if !transition.is_noop() {
            debug!(
                "Streak {transition:?}: count {} last {:?}",
                self.streak.count, self.streak.last_date
            );
        }
        transition
    }

    /// Write ledger, streak and settings back to the store.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.persist_ledger()?;
        self.persist_streak()?;
        store::write(&self.store, &self.key(StoreKey::Settings), &self.settings)
    }

    fn persist_ledger(&self) -> Result<(), StoreError> {
        store::write(&self.store, &self.key(StoreKey::Scores), &self.ledger)
    }

    fn persist_streak(&self) -> Result<(), StoreError> {
        store::write(&self.store, &self.key(StoreKey::Streak), &self.streak)
    }

    /// # Errors
    ///
    /// Returns an error if the settings cannot be persisted.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), StoreError> {
        self.settings = settings;
        store::write(&self.store, &self.key(StoreKey::Settings), &self.settings)
    }

    /// Wipe every persisted key and start over as on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be removed or the fresh state cannot be persisted.
    pub fn reset_all(&mut self) -> Result<(), StoreError> {
        for key in StoreKey::ALL {
            self.store.remove(&self.key(key))?;
        }
        info!("Progress reset: cleared {} keys", StoreKey::ALL.len());
        self.initialize()
    }

    #[must_use]
    pub const fn current_streak(&self) -> u32 {
        self.streak.count
    }

    #[must_use]
    pub const fn streak(&self) -> &StreakState {
        &self.streak
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn scores_for(&self, game: &str) -> &[ScoreRecord] {
        self.ledger.scores_for(game)
    }

    #[must_use]
    pub fn best_score(&self, game: &str, difficulty: Option<Difficulty>) -> u32 {
        self.ledger.best_score(game, difficulty)
    }

    #[must_use]
    pub fn stats_for(&self, game: &str) -> GameStats {
        self.ledger.stats_for(game)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.ledger.total_count()
    }

    /// Records dated today, across all games.
    #[must_use]
    pub fn today_scores(&self) -> Vec<DatedEntry> {
        self.ledger.entries_on(self.clock.today())
    }

    #[must_use]
    pub fn today_count(&self) -> usize {
        let today = self.clock.today();
        self.ledger
            .entries()
            .filter(|(_, record)| record.date == today)
            .count()
    }

    /// Records from the last `days` days (by timestamp), grouped by date.
    ///
    /// Within a date, entries follow ledger game order, then insertion order.
    #[must_use]
    pub fn recent_scores(&self, days: u32) -> BTreeMap<NaiveDate, Vec<DatedEntry>> {
        let cutoff = self
            .clock
            .now_millis()
            .saturating_sub(days_to_millis(days));
        let mut grouped: BTreeMap<NaiveDate, Vec<DatedEntry>> = BTreeMap::new();
        for (game, record) in self.ledger.entries() {
            if record.timestamp >= cutoff {
                grouped.entry(record.date).or_default().push(DatedEntry {
                    game: game.clone(),
                    record: record.clone(),
                });
            }
        }
        grouped
    }

    /// [`Self::recent_scores`] over the configured default window.
    #[must_use]
    pub fn recent_scores_default(&self) -> BTreeMap<NaiveDate, Vec<DatedEntry>> {
        self.recent_scores(self.config.recent_days)
    }

    /// One row per calendar day for the `days` days ending today, oldest first.
    #[must_use]
    pub fn daily_activity(&self, days: u32) -> Vec<DailyActivity> {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for (_, record) in self.ledger.entries() {
            *counts.entry(record.date).or_default() += 1;
        }
        let today = self.clock.today();
        (0..days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|date| DailyActivity {
                date,
                plays: counts.get(&date).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Built-in games first (in catalogue order), then any other recorded games.
    #[must_use]
    pub fn dashboard(&self) -> DashboardSummary {
        let mut games: Vec<GameSummary> = GameKind::ALL
            .into_iter()
            .map(|kind| self.game_summary(GameId::from(kind)))
            .collect();
        games.extend(
            self.ledger
                .games()
                .filter(|game| game.kind().is_none())
                .cloned()
                .map(|game| self.game_summary(game)),
        );
        DashboardSummary {
            streak: self.current_streak(),
            today_count: self.today_count(),
            total_count: self.total_count(),
            games,
        }
    }

    fn game_summary(&self, game: GameId) -> GameSummary {
        GameSummary {
            label: game.label().to_string(),
            stats: self.ledger.stats_for(game.as_str()),
            game,
        }
    }

    /// Consume the tracker, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }
}
