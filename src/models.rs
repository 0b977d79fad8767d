// src/models.rs

use crate::constants::{BUCKET_MAX, BUCKET_MIN, QUALITY_MAX, QUALITY_MIN, QUALITY_PASS};
use crate::error::SchedulerError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a card or question within its collection.
pub type ItemIndex = usize;

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// --- Identifiers ---

/// Identifier of a certification's card or question bank (e.g. `"a+"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        CollectionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(s: &str) -> Self {
        CollectionId::new(s)
    }
}

impl From<String> for CollectionId {
    fn from(s: String) -> Self {
        CollectionId(s)
    }
}

// --- Buckets ---

/// Leitner strength level. Always within `BUCKET_MIN..=BUCKET_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Bucket(u8);

impl Bucket {
    pub const MIN: Bucket = Bucket(BUCKET_MIN);
    pub const MAX: Bucket = Bucket(BUCKET_MAX);

    pub fn new(level: u8) -> Result<Self, SchedulerError> {
        if (BUCKET_MIN..=BUCKET_MAX).contains(&level) {
            Ok(Bucket(level))
        } else {
            Err(SchedulerError::InvalidInput(format!(
                "bucket {} outside {}..={}",
                level, BUCKET_MIN, BUCKET_MAX
            )))
        }
    }

    /// Builds a bucket from any level, clamping to the valid range.
    pub fn clamped(level: i32) -> Self {
        Bucket(level.clamp(BUCKET_MIN as i32, BUCKET_MAX as i32) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn promoted(self) -> Self {
        Bucket::clamped(self.0 as i32 + 1)
    }

    pub fn demoted(self) -> Self {
        Bucket::clamped(self.0 as i32 - 1)
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Bucket::MIN
    }
}

impl TryFrom<u8> for Bucket {
    type Error = SchedulerError;
    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Bucket::new(level)
    }
}

impl From<Bucket> for u8 {
    fn from(b: Bucket) -> u8 {
        b.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Review State ---

/// Scheduling state of one flashcard. Persisted as `{ "bucket", "nextDueAt" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub bucket: Bucket,
    #[serde(default)]
    pub next_due_at: i64,
}

impl ReviewState {
    pub fn is_due(&self, now: i64) -> bool {
        self.next_due_at <= now
    }
}

// --- Recall Outcome ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recall {
    Knew,
    Missed,
}

impl Recall {
    /// Maps a 0-5 recall quality onto the binary outcome.
    pub fn from_quality(quality: i32) -> Result<Self, SchedulerError> {
        if !(QUALITY_MIN..=QUALITY_MAX).contains(&quality) {
            return Err(SchedulerError::InvalidInput(format!(
                "quality {} outside {}..={}",
                quality, QUALITY_MIN, QUALITY_MAX
            )));
        }
        Ok(Recall::from(quality >= QUALITY_PASS))
    }

    pub fn knew(self) -> bool {
        self == Recall::Knew
    }
}

impl From<bool> for Recall {
    fn from(knew_it: bool) -> Self {
        if knew_it {
            Recall::Knew
        } else {
            Recall::Missed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_clamps_both_ends() {
        assert_eq!(Bucket::clamped(-3), Bucket::MIN);
        assert_eq!(Bucket::clamped(9), Bucket::MAX);
        assert_eq!(Bucket::MAX.promoted(), Bucket::MAX);
        assert_eq!(Bucket::MIN.demoted(), Bucket::MIN);
        assert_eq!(Bucket::MIN.promoted().level(), 2);
    }

    #[test]
    fn test_bucket_rejects_out_of_range() {
        assert!(Bucket::new(0).is_err());
        assert!(Bucket::new(6).is_err());
        assert_eq!(Bucket::new(3).unwrap().level(), 3);
    }

    #[test]
    fn test_review_state_wire_format() {
        let state = ReviewState {
            bucket: Bucket::new(2).unwrap(),
            next_due_at: 1_800_000,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"bucket":2,"nextDueAt":1800000}"#);

        let bad: Result<ReviewState, _> = serde_json::from_str(r#"{"bucket":7,"nextDueAt":0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_default_state_is_due_immediately() {
        let state = ReviewState::default();
        assert_eq!(state.bucket, Bucket::MIN);
        assert!(state.is_due(0));
    }

    #[test]
    fn test_recall_from_quality() {
        assert_eq!(Recall::from_quality(0).unwrap(), Recall::Missed);
        assert_eq!(Recall::from_quality(2).unwrap(), Recall::Missed);
        assert_eq!(Recall::from_quality(3).unwrap(), Recall::Knew);
        assert_eq!(Recall::from_quality(5).unwrap(), Recall::Knew);
        assert!(matches!(
            Recall::from_quality(6),
            Err(SchedulerError::InvalidInput(_))
        ));
        assert!(Recall::from_quality(-1).is_err());
    }
}
