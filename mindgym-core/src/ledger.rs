//! Per-game score history with a retention cap and aggregate queries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::numbers::rounded_mean;
use crate::record::{DatedEntry, Difficulty, GameId, ScoreRecord};

/// Aggregate statistics for a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub played: usize,
    pub best_score: u32,
    pub average_score: u32,
    pub last_played: Option<NaiveDate>,
}

/// Mapping from game id to its records in insertion (chronological) order.
///
/// Games iterate in lexical id order, so cross-game listings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    games: BTreeMap<GameId, Vec<ScoreRecord>>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` under `game`, keeping only the newest `cap` records.
    ///
    /// Returns the number of records evicted.
    pub fn append(&mut self, game: GameId, record: ScoreRecord, cap: usize) -> usize {
        let records = self.games.entry(game).or_default();
        records.push(record);
        truncate_oldest(records, cap)
    }

    /// Trim every game's history to `cap`, e.g. after loading data written
    /// under a larger cap. Returns the number of records evicted.
    pub fn enforce_cap(&mut self, cap: usize) -> usize {
        self.games
            .values_mut()
            .map(|records| truncate_oldest(records, cap))
            .sum()
    }

    #[must_use]
    pub fn scores_for(&self, game: &str) -> &[ScoreRecord] {
        self.games.get(game).map(Vec::as_slice).unwrap_or_default()
    }

    /// Highest score for `game`, optionally restricted to one difficulty; 0 when none match.
    #[must_use]
    pub fn best_score(&self, game: &str, difficulty: Option<Difficulty>) -> u32 {
        self.scores_for(game)
            .iter()
            .filter(|record| difficulty.is_none_or(|d| record.difficulty == d))
            .map(|record| record.score)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.games.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn stats_for(&self, game: &str) -> GameStats {
        let records = self.scores_for(game);
        let total: u64 = records.iter().map(|record| u64::from(record.score)).sum();
        GameStats {
            played: records.len(),
            best_score: self.best_score(game, None),
            average_score: rounded_mean(total, records.len()),
            last_played: records.last().map(|record| record.date),
        }
    }

    /// Ids of games that have at least one record.
    pub fn games(&self) -> impl Iterator<Item = &GameId> {
        self.games
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(game, _)| game)
    }

    /// Every record paired with its game, games in ledger order then records in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&GameId, &ScoreRecord)> {
        self.games
            .iter()
            .flat_map(|(game, records)| records.iter().map(move |record| (game, record)))
    }

    /// Records dated `date`, across all games.
    #[must_use]
    pub fn entries_on(&self, date: NaiveDate) -> Vec<DatedEntry> {
        self.entries()
            .filter(|(_, record)| record.date == date)
            .map(|(game, record)| DatedEntry {
                game: game.clone(),
                record: record.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn played_on(&self, date: NaiveDate) -> bool {
        self.entries().any(|(_, record)| record.date == date)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }
}

fn truncate_oldest(records: &mut Vec<ScoreRecord>, cap: usize) -> usize {
    let excess = records.len().saturating_sub(cap);
    if excess > 0 {
        records.drain(..excess);
    }
    excess
}
