//! Calendar clock port so date-dependent services stay testable.

use chrono::{NaiveDate, Utc};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date in the clinic's reference timezone (UTC).
    fn today(&self) -> NaiveDate;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a fixed date, for tests and fixtures.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock(pub NaiveDate);

impl Clock for FixtureClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
