use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use mindgym_core::store::{self, StoreKey};
use mindgym_core::{
    Clock, Difficulty, FixedClock, MemoryStore, ProgressTracker, StreakTransition, TrackerConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenario::{ProgressScenario, ScenarioPlan, ScenarioSummary, Step};

type Tracker<'a> = ProgressTracker<&'a MemoryStore, FixedClock>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Replays catalogued plans against an in-memory store and a fixed clock.
pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &ProgressScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.name().bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &ProgressScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = run_plan(&scenario.plan, iteration_seed).and_then(|summary| {
                evaluate_expectations(&scenario.plan, &summary)?;
                Ok(summary)
            });

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) seed:{} streak:{} records:{}",
                            i + 1,
                            iterations,
                            summary.seed,
                            summary.streak.count,
                            summary.total_count
                        );
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name().to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

fn evaluate_expectations(plan: &ScenarioPlan, summary: &ScenarioSummary) -> Result<()> {
    for expectation in &plan.expectations {
        expectation.evaluate(summary)?;
    }
    Ok(())
}

/// Execute `plan` from an empty profile and collect what the engine reports afterwards.
///
/// # Errors
///
/// Returns an error if the engine rejects a step.
pub fn run_plan(plan: &ScenarioPlan, seed: u64) -> Result<ScenarioSummary> {
    let config = TrackerConfig::default();
    let memory = MemoryStore::new();
    let clock = FixedClock::at_date(plan.start);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    if let Some(initial) = &plan.initial_streak {
        store::write(&memory, &config.key(StoreKey::Streak), initial)
            .context("failed to seed initial streak")?;
    }

    let mut summary = ScenarioSummary {
        seed,
        ..ScenarioSummary::default()
    };
    let mut tracker: Tracker<'_> =
        ProgressTracker::load_with_config(&memory, clock.clone(), config.clone())
            .context("failed to load tracker")?;

    for step in &plan.steps {
        debug!("Scenario step: {step:?}");
        match step {
            Step::Play {
                game,
                difficulty,
                count,
                max_score,
            } => {
                for _ in 0..*count {
                    let score = rng.gen_range(0..=*max_score);
                    play(&mut tracker, &mut summary, game.id(), score, *difficulty)?;
                }
            }
            Step::Score {
                game,
                score,
                difficulty,
            } => play(&mut tracker, &mut summary, game, *score, *difficulty)?,
            Step::AdvanceDays(days) => clock.advance_days(*days),
            Step::AdvanceMillis(millis) => clock.advance_millis(*millis),
            Step::Recompute => {
                let transition = tracker
                    .recompute_streak()
                    .context("failed to recompute streak")?;
                summary.transitions.push(transition);
            }
            Step::Restart => {
                drop(tracker);
                tracker = ProgressTracker::load_with_config(&memory, clock.clone(), config.clone())
                    .context("failed to reload tracker")?;
            }
            Step::Corrupt(key) => memory.insert_raw(config.key(*key), "{not json"),
            Step::Reset => tracker.reset_all().context("failed to reset progress")?,
        }
    }

    collect(&tracker, &mut summary);
    Ok(summary)
}

fn play(
    tracker: &mut Tracker<'_>,
    summary: &mut ScenarioSummary,
    game: &str,
    score: u32,
    difficulty: Difficulty,
) -> Result<()> {
    let today = tracker.clock().today();
    let transition = StreakTransition::classify(tracker.streak(), today, true);
    tracker
        .record_outcome(game, score, difficulty)
        .with_context(|| format!("failed to record {game}"))?;
    summary.transitions.push(transition);
    summary
        .submitted
        .push((game.to_string(), score, difficulty));
    Ok(())
}

fn collect(tracker: &Tracker<'_>, summary: &mut ScenarioSummary) {
    summary.streak = *tracker.streak();
    summary.total_count = tracker.total_count();
    summary.today_count = tracker.today_count();
    summary.recent_days = tracker.recent_scores_default().len();

    for game in tracker.ledger().games() {
        let key = game.as_str().to_string();
        summary
            .retained
            .insert(key.clone(), tracker.scores_for(game.as_str()).to_vec());
        summary.stats.insert(key.clone(), tracker.stats_for(game.as_str()));
        for difficulty in Difficulty::ALL {
            summary.best_by_difficulty.insert(
                (key.clone(), difficulty),
                tracker.best_score(game.as_str(), Some(difficulty)),
            );
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{find_scenario, scenario_catalog};
    use chrono::NaiveDate;
    use mindgym_core::GameKind;

    #[test]
    fn every_catalogued_scenario_passes() {
        let runner = ScenarioRunner::new(false);
        for scenario in scenario_catalog() {
            let results = runner.run_scenario(&scenario, &[1337, 7], 2);
            for result in results {
                assert!(
                    result.passed,
                    "{} failed: {:?}",
                    result.scenario_name, result.failures
                );
                assert_eq!(result.successful_iterations, 2);
            }
        }
    }

    #[test]
    fn seeded_plays_are_deterministic() {
        let scenario = find_scenario("best-and-average").unwrap();
        let first = run_plan(&scenario.plan, 99).unwrap();
        let second = run_plan(&scenario.plan, 99).unwrap();
        assert_eq!(first.submitted, second.submitted);
        let other = run_plan(&scenario.plan, 100).unwrap();
        assert_ne!(first.submitted, other.submitted);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let plan = ScenarioPlan::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .play(GameKind::MemoryMatch, Difficulty::Easy, 1)
            .with_expectation(|summary: &ScenarioSummary| -> Result<()> {
                anyhow::ensure!(summary.total_count == 2, "expected two records");
                Ok(())
            });
        let scenario = ProgressScenario::new("broken", "Broken", "always fails", plan);
        let results = ScenarioRunner::new(false).run_scenario(&scenario, &[1], 3);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 3);
        assert!(results[0].failures[0].contains("expected two records"));
        assert_eq!(results[0].average_duration, Duration::ZERO);
    }

    #[test]
    fn restart_reloads_persisted_state() {
        let plan = ScenarioPlan::new(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
            .play(GameKind::ColorClash, Difficulty::Hard, 3)
            .step(Step::Restart);
        let summary = run_plan(&plan, 1).unwrap();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.streak.count, 1);
        assert_eq!(summary.transitions[0], StreakTransition::Restarted);
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
