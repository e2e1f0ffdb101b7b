// Reading domain models
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day's aggregate for one sensor, as returned by the readings backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSeriesPoint {
    pub date: NaiveDate,
    pub average_value: f64,
    #[serde(default)]
    pub entry_count: i64,
}

impl SensorSeriesPoint {
    pub fn new(date: NaiveDate, average_value: f64, entry_count: i64) -> Self {
        Self {
            date,
            average_value,
            entry_count,
        }
    }
}

/// One day of an external series (outdoor humidity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ExternalSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Number of trailing days of history requested per fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LookbackWindow(u32);

impl LookbackWindow {
    pub const DEFAULT_DAYS: u32 = 7;
    /// Roughly a century of daily history.
    pub const MAX_DAYS: u32 = 36_500;

    /// Accepts `1..=MAX_DAYS`.
    pub fn new(days: u32) -> Option<Self> {
        (1..=Self::MAX_DAYS).contains(&days).then_some(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    /// Inclusive `[today - days, today]` range, `None` if the start would
    /// fall before the earliest representable date.
    pub fn date_range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = today.checked_sub_signed(Duration::days(i64::from(self.0)))?;
        Some((start, today))
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}
