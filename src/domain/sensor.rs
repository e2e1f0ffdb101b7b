// Sensor domain model
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub unique_identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub latest_entry: Option<DateTime<Utc>>,
}

impl Sensor {
    pub fn new(unique_identifier: String) -> Self {
        Self {
            unique_identifier,
            label: None,
            count: 0,
            latest_entry: None,
        }
    }

    /// User-assigned label, falling back to the raw identifier.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.unique_identifier)
    }

    /// A sensor is considered online when its latest entry is from today (UTC).
    pub fn is_reporting_today(&self, today: NaiveDate) -> bool {
        self.latest_entry
            .map(|ts| ts.date_naive() == today)
            .unwrap_or(false)
    }
}
