//! Time sources for the progress engine.
//!
//! Every date the engine stores is a UTC calendar day derived from a
//! millisecond timestamp, so a [`Clock`] only has to report "now".

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::constants::MILLIS_PER_DAY;

/// Source of the current instant.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// UTC calendar date of [`Clock::now_millis`].
    fn today(&self) -> NaiveDate {
        date_from_millis(self.now_millis())
    }
}

/// UTC calendar date for a millisecond timestamp; out-of-range values map to the epoch.
#[must_use]
pub fn date_from_millis(millis: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .date_naive()
}

/// Millisecond timestamp of midnight UTC on `date`.
#[must_use]
pub fn midnight_millis(date: NaiveDate) -> i64 {
    let epoch = DateTime::<Utc>::default().date_naive();
    date.signed_duration_since(epoch)
        .num_days()
        .saturating_mul(MILLIS_PER_DAY)
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    millis: Rc<Cell<i64>>,
}

impl FixedClock {
    const NOON_OFFSET: i64 = MILLIS_PER_DAY / 2;

    #[must_use]
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Rc::new(Cell::new(millis)),
        }
    }

    /// Clock reading noon UTC on `date`.
    #[must_use]
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(midnight_millis(date) + Self::NOON_OFFSET)
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.set(millis);
    }

    /// Jump to noon UTC on `date`.
    pub fn set_date(&self, date: NaiveDate) {
        self.set_millis(midnight_millis(date) + Self::NOON_OFFSET);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.set(self.millis.get().saturating_add(delta));
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_millis(days.saturating_mul(MILLIS_PER_DAY));
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.get()
    }
}
