// src/constants.rs

// --- Time Constants ---
pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

// --- Leitner Buckets ---
pub const BUCKET_MIN: u8 = 1;
pub const BUCKET_MAX: u8 = 5;
pub const BUCKET_COUNT: usize = (BUCKET_MAX - BUCKET_MIN + 1) as usize;

// Delay applied after a grade lands an item in bucket N (index N - 1).
pub const DEFAULT_DELAYS_MS: [i64; BUCKET_COUNT] = [
    5 * MINUTE_MS,  // Bucket 1
    30 * MINUTE_MS, // Bucket 2
    12 * HOUR_MS,   // Bucket 3
    24 * HOUR_MS,   // Bucket 4
    72 * HOUR_MS,   // Bucket 5
];

// --- Recall Quality (0-5 scale) ---
pub const QUALITY_MIN: i32 = 0;
pub const QUALITY_MAX: i32 = 5;
pub const QUALITY_PASS: i32 = 3; // >= this counts as "knew it"

// --- Adaptive Learning ---
pub const WEAK_TOPIC_LIMIT: usize = 3;
pub const FLASHCARD_TOPIC: &str = "flashcards";

// --- Storage Keys ---
pub const REVIEW_KEY_PREFIX: &str = "srs";
pub const WRONG_COUNT_KEY_PREFIX: &str = "wrong";
pub const TOPIC_STATS_KEY_PREFIX: &str = "stats";

// --- Defaults ---
pub const DEFAULT_DB_FILE: &str = "study_scheduler.db";
pub const DEFAULT_LOG_FILTER: &str = "info";
