// src/config.rs

//! Scheduler configuration.
//!
//! Loaded from an optional JSON file; every field falls back to its default:
//!
//! ```json
//! {
//!   "database_path": "study_scheduler.db",
//!   "schedule_minutes": [5, 30, 720, 1440, 4320],
//!   "log_filter": "info"
//! }
//! ```

use crate::constants::*;
use crate::error::{ConfigError, SchedulerError};
use crate::models::Bucket;
use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bucket-to-delay table. Entry N-1 is the wait applied after an item lands
/// in bucket N. All entries are strictly positive whole minutes, matching the
/// `schedule_minutes` config format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct ScheduleTable {
    delays_ms: [i64; BUCKET_COUNT],
}

impl ScheduleTable {
    pub fn from_millis(delays_ms: [i64; BUCKET_COUNT]) -> Result<Self, SchedulerError> {
        if let Some(pos) = delays_ms.iter().position(|&d| d <= 0) {
            return Err(SchedulerError::InvalidInput(format!(
                "delay for bucket {} must be positive",
                pos + 1
            )));
        }
        if let Some(pos) = delays_ms.iter().position(|&d| d % MINUTE_MS != 0) {
            return Err(SchedulerError::InvalidInput(format!(
                "delay for bucket {} must be a whole number of minutes",
                pos + 1
            )));
        }
        Ok(ScheduleTable { delays_ms })
    }

    pub fn from_minutes(minutes: &[u64]) -> Result<Self, SchedulerError> {
        if minutes.len() != BUCKET_COUNT {
            return Err(SchedulerError::InvalidInput(format!(
                "expected {} delays, got {}",
                BUCKET_COUNT,
                minutes.len()
            )));
        }
        let mut delays_ms = [0i64; BUCKET_COUNT];
        for (slot, &m) in delays_ms.iter_mut().zip(minutes) {
            *slot = i64::try_from(m)
                .ok()
                .and_then(|m| m.checked_mul(MINUTE_MS))
                .ok_or_else(|| {
                    SchedulerError::InvalidInput(format!("delay of {} minutes is too large", m))
                })?;
        }
        Self::from_millis(delays_ms)
    }

    pub fn delay_ms(&self, bucket: Bucket) -> i64 {
        self.delays_ms[(bucket.level() - BUCKET_MIN) as usize]
    }

    pub fn delay(&self, bucket: Bucket) -> Duration {
        Duration::milliseconds(self.delay_ms(bucket))
    }

    /// Timestamp at which an item graded at `now` into `bucket` becomes due.
    /// `None` when the sum does not fit in an `i64`.
    pub fn due_after(&self, bucket: Bucket, now: i64) -> Option<i64> {
        now.checked_add(self.delay_ms(bucket))
    }
}

impl Default for ScheduleTable {
    fn default() -> Self {
        ScheduleTable {
            delays_ms: DEFAULT_DELAYS_MS,
        }
    }
}

impl TryFrom<Vec<u64>> for ScheduleTable {
    type Error = SchedulerError;
    fn try_from(minutes: Vec<u64>) -> Result<Self, Self::Error> {
        ScheduleTable::from_minutes(&minutes)
    }
}

impl From<ScheduleTable> for Vec<u64> {
    fn from(table: ScheduleTable) -> Vec<u64> {
        table
            .delays_ms
            .iter()
            .map(|&ms| (ms / MINUTE_MS) as u64)
            .collect()
    }
}

/// Human-readable delay, e.g. `5m`, `12h`, `3d`.
pub fn format_delay(ms: i64) -> String {
    if ms <= 0 {
        "now".to_string()
    } else if ms < HOUR_MS {
        format!("{}m", (ms + MINUTE_MS - 1) / MINUTE_MS)
    } else if ms < DAY_MS {
        format!("{}h", ms / HOUR_MS)
    } else {
        format!("{}d", ms / DAY_MS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub database_path: PathBuf,
    #[serde(rename = "schedule_minutes")]
    pub schedule: ScheduleTable,
    pub log_filter: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            schedule: ScheduleTable::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("[Config] Loading {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_observed_delays() {
        let table = ScheduleTable::default();
        let minutes: Vec<u64> = table.clone().into();
        assert_eq!(minutes, vec![5, 30, 720, 1440, 4320]);
        assert_eq!(table.delay_ms(Bucket::MIN), 5 * MINUTE_MS);
        assert_eq!(table.delay(Bucket::MAX), Duration::hours(72));
    }

    #[test]
    fn test_table_rejects_bad_shapes() {
        assert!(ScheduleTable::from_minutes(&[5, 30, 720]).is_err());
        assert!(ScheduleTable::from_minutes(&[5, 0, 720, 1440, 4320]).is_err());
        assert!(ScheduleTable::from_millis([1, 2, 3, 4, -5]).is_err());
        assert!(ScheduleTable::from_millis([
            30_000,
            90_000,
            HOUR_MS,
            DAY_MS,
            3 * DAY_MS
        ])
        .is_err());
    }

    #[test]
    fn test_config_serialization_round_trips() {
        let config = SchedulerConfig {
            schedule: ScheduleTable::from_millis([
                MINUTE_MS,
                2 * MINUTE_MS,
                HOUR_MS,
                DAY_MS,
                3 * DAY_MS,
            ])
            .unwrap(),
            ..SchedulerConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""schedule_minutes":[1,2,60,1440,4320]"#));
        assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_due_after_overflow() {
        let table = ScheduleTable::default();
        assert_eq!(table.due_after(Bucket::MAX, i64::MAX), None);
        assert_eq!(table.due_after(Bucket::MIN, 1_000), Some(1_000 + 5 * MINUTE_MS));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SchedulerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_config_overrides_schedule() {
        let config = SchedulerConfig::from_json_str(
            r#"{ "schedule_minutes": [1, 2, 3, 4, 5], "log_filter": "debug" }"#,
        )
        .unwrap();
        assert_eq!(config.schedule.delay_ms(Bucket::MAX), 5 * MINUTE_MS);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_FILE));
    }

    #[test]
    fn test_config_rejects_malformed_schedule() {
        let err = SchedulerConfig::from_json_str(r#"{ "schedule_minutes": [5, 30] }"#);
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchedulerConfig::load(Path::new("/nonexistent/study.json"));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_format_delay() {
        assert_eq!(format_delay(0), "now");
        assert_eq!(format_delay(5 * MINUTE_MS), "5m");
        assert_eq!(format_delay(30 * MINUTE_MS), "30m");
        assert_eq!(format_delay(12 * HOUR_MS), "12h");
        assert_eq!(format_delay(24 * HOUR_MS), "1d");
        assert_eq!(format_delay(72 * HOUR_MS), "3d");
    }
}
