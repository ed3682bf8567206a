use serde::{Deserialize, Serialize};

/// One row of the usage table, in the order the portal rendered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: String,
    pub time: String,
    /// Gallons. Never negative; unparsable cells are recorded as 0.0.
    pub usage: f64,
}

impl UsageRecord {
    /// `"<date> <time>"`, e.g. `11/26/24 3:00 AM`.
    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Aggregate over the rows visible on the summary page at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Usage of the first (most recent) row.
    pub current_usage: f64,
    /// Sum over every visible row. Not restricted to the current day.
    pub daily_usage: f64,
    pub last_reading: Option<String>,
    pub raw_data: Vec<UsageRecord>,
}

impl UsageSnapshot {
    pub fn from_records(records: Vec<UsageRecord>) -> Self {
        let current_usage = records.first().map(|r| r.usage).unwrap_or(0.0);
        let daily_usage = records.iter().map(|r| r.usage).sum();
        let last_reading = records.first().map(UsageRecord::timestamp);

        Self {
            current_usage,
            daily_usage,
            last_reading,
            raw_data: records,
        }
    }
}
