//! Time source for every date-sensitive operation.
//!
//! Streaks, review schedules and the daily seed all hinge on "today", so the
//! engine never calls `Utc::now()` directly.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date in UTC, the same notion of "day" the daily key uses.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock used by tests and replay tooling.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to noon UTC on the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(noon_utc(date))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set(noon_utc(date));
    }

    pub fn advance_days(&self, days: i64) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += Duration::days(days);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN).and_utc())
}
