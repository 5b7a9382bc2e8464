//! Consecutive-day play streak.
//!
//! The streak is re-evaluated after every recorded outcome and once at
//! startup. Each evaluation picks exactly one [`StreakTransition`]:
//!
//! | played today | last date          | transition       |
//! |--------------|--------------------|------------------|
//! | yes          | today              | `AlreadyCounted` |
//! | yes          | yesterday          | `Continued`      |
//! | yes          | older / never      | `Restarted`      |
//! | no           | today / yesterday  | `Grace`          |
//! | no           | older / never      | `Lapsed`         |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub count: u32,
    pub last_date: Option<NaiveDate>,
}

impl StreakState {
    #[must_use]
    pub const fn new(count: u32, last_date: Option<NaiveDate>) -> Self {
        Self { count, last_date }
    }
}

/// Outcome of a single streak evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// Today was already counted.
    AlreadyCounted,
    /// Played yesterday and today: count grows by one.
    Continued,
    /// First play after a gap (or ever): count restarts at one.
    Restarted,
    /// Nothing today and the last play is older than yesterday: count drops to zero.
    Lapsed,
    /// Nothing today yet but the streak is still alive.
    Grace,
}

impl StreakTransition {
    /// Classify the evaluation for `current` on `today`.
    #[must_use]
    pub fn classify(current: &StreakState, today: NaiveDate, played_today: bool) -> Self {
        let yesterday = today.pred_opt();
        let last = current.last_date;
        let recent = last.is_some_and(|date| date == today || Some(date) == yesterday);

        match (played_today, last) {
            (true, Some(date)) if date == today => Self::AlreadyCounted,
            (true, Some(date)) if Some(date) == yesterday => Self::Continued,
            (true, _) => Self::Restarted,
            (false, _) if recent => Self::Grace,
            (false, _) => Self::Lapsed,
        }
    }

    /// Apply this transition to `current`.
    #[must_use]
    pub const fn apply(self, current: StreakState, today: NaiveDate) -> StreakState {
        match self {
            Self::AlreadyCounted | Self::Grace => current,
            Self::Continued => StreakState {
                count: current.count.saturating_add(1),
                last_date: Some(today),
            },
            Self::Restarted => StreakState {
                count: 1,
                last_date: Some(today),
            },
            Self::Lapsed => StreakState {
                count: 0,
                last_date: current.last_date,
            },
        }
    }

    /// True when applying the transition leaves the state untouched.
    #[must_use]
    pub const fn is_noop(self) -> bool {
        matches!(self, Self::AlreadyCounted | Self::Grace)
    }
}

/// Next streak state given whether anything was recorded on `today`.
#[must_use]
pub fn next_streak_state(current: StreakState, today: NaiveDate, played_today: bool) -> StreakState {
    StreakTransition::classify(&current, today, played_today).apply(current, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn same_day_play_is_counted_once() {
        let current = StreakState::new(4, Some(day(10)));
        assert_eq!(
            StreakTransition::classify(&current, day(10), true),
            StreakTransition::AlreadyCounted
        );
        assert_eq!(next_streak_state(current, day(10), true), current);
    }

    #[test]
    fn play_after_yesterday_continues() {
        let current = StreakState::new(4, Some(day(9)));
        assert_eq!(
            next_streak_state(current, day(10), true),
            StreakState::new(5, Some(day(10)))
        );
    }

    #[test]
    fn play_after_gap_restarts_at_one() {
        let stale = StreakState::new(12, Some(day(7)));
        assert_eq!(
            next_streak_state(stale, day(10), true),
            StreakState::new(1, Some(day(10)))
        );
        assert_eq!(
            next_streak_state(StreakState::default(), day(10), true),
            StreakState::new(1, Some(day(10)))
        );
    }

    #[test]
    fn idle_day_after_yesterday_is_grace() {
        let current = StreakState::new(3, Some(day(9)));
        assert_eq!(
            StreakTransition::classify(&current, day(10), false),
            StreakTransition::Grace
        );
        assert_eq!(next_streak_state(current, day(10), false), current);

        let played_today = StreakState::new(3, Some(day(10)));
        assert_eq!(next_streak_state(played_today, day(10), false), played_today);
    }

    #[test]
    fn idle_after_missed_day_lapses_but_keeps_date() {
        let current = StreakState::new(5, Some(day(8)));
        let next = next_streak_state(current, day(10), false);
        assert_eq!(next, StreakState::new(0, Some(day(8))));
        assert_eq!(
            StreakTransition::classify(&current, day(10), false),
            StreakTransition::Lapsed
        );
    }

    #[test]
    fn never_played_and_idle_stays_zero() {
        let next = next_streak_state(StreakState::default(), day(10), false);
        assert_eq!(next, StreakState::default());
    }

    #[test]
    fn month_boundary_counts_as_yesterday() {
        let current = StreakState::new(2, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(
            next_streak_state(current, day(1), true),
            StreakState::new(3, Some(day(1)))
        );
    }

    #[test]
    fn count_saturates() {
        let current = StreakState::new(u32::MAX, Some(day(9)));
        assert_eq!(next_streak_state(current, day(10), true).count, u32::MAX);
    }

    #[test]
    fn noop_transitions_are_flagged() {
        assert!(StreakTransition::Grace.is_noop());
        assert!(StreakTransition::AlreadyCounted.is_noop());
        assert!(!StreakTransition::Lapsed.is_noop());
    }

    #[test]
    fn state_uses_camel_case_layout() {
        let value = serde_json::to_value(StreakState::new(2, Some(day(5)))).unwrap();
        assert_eq!(value, serde_json::json!({"count": 2, "lastDate": "2024-03-05"}));
        let empty = serde_json::to_value(StreakState::default()).unwrap();
        assert_eq!(empty, serde_json::json!({"count": 0, "lastDate": null}));
    }
}
