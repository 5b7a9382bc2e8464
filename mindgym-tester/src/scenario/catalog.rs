use anyhow::{Result, ensure};
use chrono::NaiveDate;
use mindgym_core::{
    Difficulty, GameKind, SCORE_HISTORY_CAP, StoreKey, StreakState, StreakTransition,
};

use super::{ProgressScenario, ScenarioPlan, ScenarioSummary, Step};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default()
}

fn days_before_start(days: u64) -> Option<NaiveDate> {
    start_date().checked_sub_days(chrono::Days::new(days))
}

pub fn scenario_catalog() -> Vec<ProgressScenario> {
    vec![
        ProgressScenario::new(
            "smoke",
            "First Recorded Game",
            "Empty profile records one game; best, total and streak reflect it",
            ScenarioPlan::new(start_date())
                .step(Step::Score {
                    game: "memory-match",
                    score: 450,
                    difficulty: Difficulty::Easy,
                })
                .with_expectation(first_game_expectation),
        ),
        ProgressScenario::new(
            "daily-streak",
            "Ten Day Streak",
            "Playing every day for ten days grows the streak to ten",
            daily_streak_plan(10).with_expectation(daily_streak_expectation),
        ),
        ProgressScenario::new(
            "same-day-idempotent",
            "Many Games In One Day",
            "Several games on one day count the streak once",
            ScenarioPlan::new(start_date())
                .play(GameKind::ColorClash, Difficulty::Easy, 3)
                .play(GameKind::PatternLogic, Difficulty::Hard, 4)
                .step(Step::Recompute)
                .with_expectation(same_day_expectation),
        ),
        ProgressScenario::new(
            "grace-window",
            "Grace Before Playing",
            "A day without play yet keeps yesterday's streak intact",
            ScenarioPlan::new(start_date())
                .with_initial_streak(StreakState::new(4, days_before_start(1)))
                .step(Step::Recompute)
                .with_expectation(grace_expectation),
        ),
        ProgressScenario::new(
            "streak-break",
            "Missed Day Breaks Streak",
            "A streak last advanced two days ago drops to zero at startup",
            ScenarioPlan::new(start_date())
                .with_initial_streak(StreakState::new(5, days_before_start(2)))
                .step(Step::Recompute)
                .with_expectation(streak_break_expectation),
        ),
        ProgressScenario::new(
            "restart-after-gap",
            "Restart After Gap",
            "Returning after several idle days restarts the streak at one",
            daily_streak_plan(3)
                .advance_days(3)
                .play(GameKind::NumberMemory, Difficulty::Medium, 1)
                .with_expectation(restart_expectation),
        ),
        ProgressScenario::new(
            "midnight-rollover",
            "Play Across Midnight",
            "A late game and an early game on consecutive days continue the streak",
            ScenarioPlan::new(start_date())
                .step(Step::AdvanceMillis(11 * 3_600_000 + 59 * 60_000))
                .play(GameKind::ReactionFocus, Difficulty::Hard, 1)
                .step(Step::AdvanceMillis(2 * 60_000))
                .play(GameKind::ReactionFocus, Difficulty::Hard, 1)
                .with_expectation(midnight_expectation),
        ),
        ProgressScenario::new(
            "history-cap",
            "History Cap Eviction",
            "Recording past the per-game cap keeps only the newest records",
            ScenarioPlan::new(start_date())
                .step(Step::Play {
                    game: GameKind::SequenceRecall,
                    difficulty: Difficulty::Medium,
                    count: SCORE_HISTORY_CAP + 37,
                    max_score: 5_000,
                })
                .with_expectation(history_cap_expectation),
        ),
        ProgressScenario::new(
            "best-and-average",
            "Best And Average Scores",
            "Best, per-difficulty best and rounded average agree with the retained scores",
            ScenarioPlan::new(start_date())
                .play(GameKind::MemoryMatch, Difficulty::Easy, 6)
                .play(GameKind::MemoryMatch, Difficulty::Hard, 4)
                .advance_days(1)
                .play(GameKind::ReactionFocus, Difficulty::Medium, 5)
                .with_expectation(aggregates_expectation),
        ),
        ProgressScenario::new(
            "corrupt-recovery",
            "Corrupt Storage Recovery",
            "A corrupt score payload is discarded on restart without losing the streak",
            ScenarioPlan::new(start_date())
                .play(GameKind::PatternLogic, Difficulty::Easy, 2)
                .step(Step::Corrupt(StoreKey::Scores))
                .step(Step::Restart)
                .with_expectation(corrupt_recovery_expectation),
        ),
        ProgressScenario::new(
            "reset-all",
            "Reset All Progress",
            "Reset wipes scores, streak and settings back to first-run state",
            daily_streak_plan(2)
                .step(Step::Reset)
                .with_expectation(reset_expectation),
        ),
    ]
}

pub fn find_scenario(key: &str) -> Option<ProgressScenario> {
    scenario_catalog()
        .into_iter()
        .find(|scenario| scenario.key() == key)
}

fn daily_streak_plan(days: usize) -> ScenarioPlan {
    let games = GameKind::ALL;
    let mut plan = ScenarioPlan::new(start_date());
    for day in 0..days {
        if day > 0 {
            plan = plan.advance_days(1);
        }
        plan = plan.play(games[day % games.len()], Difficulty::Medium, 1);
    }
    plan
}

fn first_game_expectation(summary: &ScenarioSummary) -> Result<()> {
    let stats = summary.stats_for("memory-match");
    ensure!(
        stats.best_score == 450,
        "Best score should be 450, got {}",
        stats.best_score
    );
    ensure!(summary.total_count == 1, "Total count should be 1");
    ensure!(summary.streak.count == 1, "Streak should start at 1");
    ensure!(
        summary.streak.last_date == Some(start_date()),
        "Streak should be dated today"
    );
    Ok(())
}

fn daily_streak_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(
        summary.streak.count == 10,
        "Streak should reach 10, got {}",
        summary.streak.count
    );
    let continued = summary
        .transitions
        .iter()
        .filter(|t| matches!(t, StreakTransition::Continued))
        .count();
    ensure!(continued == 9, "Expected 9 continuations, saw {continued}");
    ensure!(
        summary.recent_days == 8,
        "The inclusive seven-day window should span eight play dates, got {}",
        summary.recent_days
    );
    Ok(())
}

fn same_day_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(summary.streak.count == 1, "Streak should count the day once");
    ensure!(summary.today_count == 7, "All seven games should be today");
    ensure!(
        summary.transitions.last() == Some(&StreakTransition::AlreadyCounted),
        "Recomputation after playing should be a no-op"
    );
    Ok(())
}

fn grace_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(
        summary.streak == StreakState::new(4, days_before_start(1)),
        "Grace should leave the streak untouched, got {:?}",
        summary.streak
    );
    ensure!(
        summary
            .transitions
            .iter()
            .all(|t| *t == StreakTransition::Grace),
        "Every evaluation should be grace"
    );
    Ok(())
}

fn streak_break_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(summary.streak.count == 0, "Streak should lapse to 0");
    ensure!(
        summary.streak.last_date == days_before_start(2),
        "Lapse keeps the last played date"
    );
    Ok(())
}

fn restart_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(
        summary.streak.count == 1,
        "Streak should restart at 1, got {}",
        summary.streak.count
    );
    ensure!(
        summary.transitions.contains(&StreakTransition::Restarted),
        "Expected a restart transition"
    );
    ensure!(summary.total_count == 4, "All four plays should be kept");
    Ok(())
}

fn midnight_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(
        summary.streak.count == 2,
        "Plays either side of midnight should make a two day streak, got {}",
        summary.streak.count
    );
    ensure!(summary.today_count == 1, "Only the early game is today");
    ensure!(
        summary.transitions == [StreakTransition::Restarted, StreakTransition::Continued],
        "Unexpected transitions {:?}",
        summary.transitions
    );
    Ok(())
}

fn history_cap_expectation(summary: &ScenarioSummary) -> Result<()> {
    let retained = summary.retained_for("sequence-recall");
    ensure!(
        retained.len() == SCORE_HISTORY_CAP,
        "Expected {SCORE_HISTORY_CAP} retained records, got {}",
        retained.len()
    );
    let newest: Vec<u32> = summary
        .submitted
        .iter()
        .rev()
        .take(SCORE_HISTORY_CAP)
        .rev()
        .map(|(_, score, _)| *score)
        .collect();
    let kept: Vec<u32> = retained.iter().map(|record| record.score).collect();
    ensure!(kept == newest, "Retained records should be the newest submissions");
    ensure!(
        retained
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp),
        "Retained records should stay in chronological order"
    );
    Ok(())
}

fn aggregates_expectation(summary: &ScenarioSummary) -> Result<()> {
    for (game, records) in &summary.retained {
        let stats = summary.stats_for(game);
        let max = records.iter().map(|r| r.score).max().unwrap_or(0);
        ensure!(
            stats.best_score == max,
            "{game}: best {} != max {max}",
            stats.best_score
        );
        let total: u64 = records.iter().map(|r| u64::from(r.score)).sum();
        let count = u64::try_from(records.len()).unwrap_or(u64::MAX).max(1);
        let expected_avg = (total * 2 + count) / (count * 2);
        ensure!(
            u64::from(stats.average_score) == expected_avg,
            "{game}: average {} != {expected_avg}",
            stats.average_score
        );

        for difficulty in Difficulty::ALL {
            let expected = records
                .iter()
                .filter(|r| r.difficulty == difficulty)
                .map(|r| r.score)
                .max()
                .unwrap_or(0);
            let reported = summary
                .best_by_difficulty
                .get(&(game.clone(), difficulty))
                .copied()
                .unwrap_or(0);
            ensure!(
                reported == expected,
                "{game} {difficulty}: best {reported} != {expected}"
            );
        }
    }
    ensure!(summary.streak.count == 2, "Two consecutive days played");
    Ok(())
}

fn corrupt_recovery_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(
        summary.total_count == 0,
        "Corrupt ledger should load as empty"
    );
    ensure!(
        summary.streak.count == 1,
        "Streak stored under its own key should survive"
    );
    Ok(())
}

fn reset_expectation(summary: &ScenarioSummary) -> Result<()> {
    ensure!(summary.total_count == 0, "Reset should clear the ledger");
    ensure!(
        summary.streak == StreakState::default(),
        "Reset should zero the streak"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let catalog = scenario_catalog();
        let mut keys: Vec<&str> = catalog.iter().map(ProgressScenario::key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), catalog.len());
    }

    #[test]
    fn find_scenario_by_key() {
        assert_eq!(
            find_scenario("history-cap").map(|s| s.name()),
            Some("History Cap Eviction")
        );
        assert!(find_scenario("missing").is_none());
    }

    #[test]
    fn daily_plan_alternates_games() {
        let plan = daily_streak_plan(3);
        let plays = plan
            .steps
            .iter()
            .filter(|step| matches!(step, Step::Play { .. }))
            .count();
        assert_eq!(plays, 3);
        assert_eq!(plan.steps.len(), 5);
    }
}
