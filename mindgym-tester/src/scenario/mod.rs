use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use mindgym_core::{
    Difficulty, GameKind, GameStats, ScoreRecord, StoreKey, StreakState, StreakTransition,
};

pub mod catalog;

pub use catalog::{find_scenario, scenario_catalog};

/// One action in a scripted play history.
#[derive(Debug, Clone)]
pub enum Step {
    /// Play `count` sessions with seeded random scores up to `max_score`.
    Play {
        game: GameKind,
        difficulty: Difficulty,
        count: usize,
        max_score: u32,
    },
    /// Record a fixed score under an arbitrary game id.
    Score {
        game: &'static str,
        score: u32,
        difficulty: Difficulty,
    },
    AdvanceDays(i64),
    AdvanceMillis(i64),
    /// Re-evaluate the streak without playing.
    Recompute,
    /// Drop the tracker and load it again from the same store.
    Restart,
    /// Overwrite a persisted key with garbage.
    Corrupt(StoreKey),
    Reset,
}

/// Assertion hook run after a plan completes.
type ScenarioExpectationFn = Arc<dyn Fn(&ScenarioSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct ScenarioExpectation(ScenarioExpectationFn);

impl std::fmt::Debug for ScenarioExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioExpectation").finish()
    }
}

impl ScenarioExpectation {
    /// # Errors
    ///
    /// Returns the first violated check.
    pub fn evaluate(&self, summary: &ScenarioSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for ScenarioExpectation
where
    F: Fn(&ScenarioSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Scripted play history plus the checks it must satisfy.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub start: NaiveDate,
    pub initial_streak: Option<StreakState>,
    pub steps: Vec<Step>,
    pub expectations: Vec<ScenarioExpectation>,
}

impl ScenarioPlan {
    #[must_use]
    pub const fn new(start: NaiveDate) -> Self {
        Self {
            start,
            initial_streak: None,
            steps: Vec::new(),
            expectations: Vec::new(),
        }
    }

    /// Persist `streak` before the tracker is first loaded.
    #[must_use]
    pub const fn with_initial_streak(mut self, streak: StreakState) -> Self {
        self.initial_streak = Some(streak);
        self
    }

    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn play(self, game: GameKind, difficulty: Difficulty, count: usize) -> Self {
        self.step(Step::Play {
            game,
            difficulty,
            count,
            max_score: 1_000,
        })
    }

    #[must_use]
    pub fn advance_days(self, days: i64) -> Self {
        self.step(Step::AdvanceDays(days))
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<ScenarioExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// A named, catalogued plan.
#[derive(Debug, Clone)]
pub struct ProgressScenario {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    pub plan: ScenarioPlan,
}

impl ProgressScenario {
    #[must_use]
    pub const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        plan: ScenarioPlan,
    ) -> Self {
        Self {
            key,
            name,
            description,
            plan,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

/// Observable state after a plan has run.
#[derive(Debug, Clone, Default)]
pub struct ScenarioSummary {
    pub seed: u64,
    pub streak: StreakState,
    pub transitions: Vec<StreakTransition>,
    pub total_count: usize,
    pub today_count: usize,
    /// Every score submitted, in order, including ones later evicted.
    pub submitted: Vec<(String, u32, Difficulty)>,
    /// Records still held in the ledger.
    pub retained: BTreeMap<String, Vec<ScoreRecord>>,
    pub stats: BTreeMap<String, GameStats>,
    pub best_by_difficulty: BTreeMap<(String, Difficulty), u32>,
    pub recent_days: usize,
}

impl ScenarioSummary {
    #[must_use]
    pub fn retained_for(&self, game: &str) -> &[ScoreRecord] {
        self.retained.get(game).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn stats_for(&self, game: &str) -> GameStats {
        self.stats.get(game).copied().unwrap_or_default()
    }
}

/// `(key, description)` pairs for `--list-scenarios`.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    scenario_catalog()
        .iter()
        .map(|scenario| (scenario.key(), scenario.description()))
        .collect()
}

/// Expand `all` into every catalogued key, keeping other names in order.
#[must_use]
pub fn expand_scenarios(names: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = names.iter().filter(|n| *n != "all").cloned().collect();
    if names.iter().any(|n| n == "all") {
        for scenario in scenario_catalog() {
            if !expanded.iter().any(|n| n == scenario.key()) {
                expanded.push(scenario.key().to_string());
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_steps_in_order() {
        let plan = ScenarioPlan::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .play(GameKind::MemoryMatch, Difficulty::Easy, 2)
            .advance_days(1)
            .step(Step::Recompute);
        assert_eq!(plan.steps.len(), 3);
        assert!(matches!(plan.steps[1], Step::AdvanceDays(1)));
    }

    #[test]
    fn expand_all_appends_catalogue_once() {
        let expanded = expand_scenarios(&["smoke".to_string(), "all".to_string()]);
        assert_eq!(expanded[0], "smoke");
        assert_eq!(expanded.iter().filter(|n| *n == "smoke").count(), 1);
        assert_eq!(expanded.len(), scenario_catalog().len());
    }

    #[test]
    fn listing_covers_catalogue() {
        let listed = list_scenarios();
        assert!(listed.iter().any(|(key, _)| *key == "daily-streak"));
        assert_eq!(listed.len(), scenario_catalog().len());
    }
}
