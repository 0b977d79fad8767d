// src/repository.rs

//! Key-value access to the study tables.
//!
//! Each collection owns three keys holding JSON documents:
//! `srs:{id}` (flashcard review table), `wrong:{id}` (quiz wrong counts) and
//! `stats:{id}` (topic statistics).

use crate::constants::*;
use crate::error::StorageError;
use crate::models::{now_millis, CollectionId};
use crate::pedagogy::{TopicStats, WrongCounts};
use crate::scheduler::ReviewTable;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn collection_key(prefix: &str, collection: &CollectionId) -> String {
    format!("{}:{}", prefix, collection)
}

// --- Raw Key-Value ---

pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
        row.get(0)
    })
    .optional()
}

pub fn put_value(conn: &Connection, key: &str, value: &str, updated_at: i64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
        params![key, value, updated_at],
    )?;
    Ok(())
}

/// Returns whether a row was removed.
pub fn delete_value(conn: &Connection, key: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM kv_store WHERE key = ?", [key])?;
    Ok(n > 0)
}

// --- JSON Documents ---

/// Missing keys read as `T::default()`.
fn load_json<T: DeserializeOwned + Default>(
    conn: &Connection,
    key: &str,
) -> std::result::Result<T, StorageError> {
    match get_value(conn, key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => {
            debug!("[Storage] No value under {}", key);
            Ok(T::default())
        }
    }
}

fn save_json<T: Serialize>(
    conn: &Connection,
    key: &str,
    value: &T,
) -> std::result::Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    put_value(conn, key, &raw, now_millis())?;
    debug!("[Storage] Wrote {} bytes under {}", raw.len(), key);
    Ok(())
}

pub fn load_review_table(
    conn: &Connection,
    collection: &CollectionId,
) -> std::result::Result<ReviewTable, StorageError> {
    load_json(conn, &collection_key(REVIEW_KEY_PREFIX, collection))
}

pub fn save_review_table(
    conn: &Connection,
    collection: &CollectionId,
    table: &ReviewTable,
) -> std::result::Result<(), StorageError> {
    save_json(conn, &collection_key(REVIEW_KEY_PREFIX, collection), table)
}

pub fn load_wrong_counts(
    conn: &Connection,
    collection: &CollectionId,
) -> std::result::Result<WrongCounts, StorageError> {
    load_json(conn, &collection_key(WRONG_COUNT_KEY_PREFIX, collection))
}

pub fn save_wrong_counts(
    conn: &Connection,
    collection: &CollectionId,
    counts: &WrongCounts,
) -> std::result::Result<(), StorageError> {
    save_json(conn, &collection_key(WRONG_COUNT_KEY_PREFIX, collection), counts)
}

pub fn load_topic_stats(
    conn: &Connection,
    collection: &CollectionId,
) -> std::result::Result<TopicStats, StorageError> {
    load_json(conn, &collection_key(TOPIC_STATS_KEY_PREFIX, collection))
}

pub fn save_topic_stats(
    conn: &Connection,
    collection: &CollectionId,
    stats: &TopicStats,
) -> std::result::Result<(), StorageError> {
    save_json(conn, &collection_key(TOPIC_STATS_KEY_PREFIX, collection), stats)
}

/// Removes every table stored for a collection. Returns the number of keys deleted.
pub fn delete_collection(conn: &Connection, collection: &CollectionId) -> Result<usize> {
    let mut removed = 0;
    for prefix in [REVIEW_KEY_PREFIX, WRONG_COUNT_KEY_PREFIX, TOPIC_STATS_KEY_PREFIX] {
        if delete_value(conn, &collection_key(prefix, collection))? {
            removed += 1;
        }
    }
    Ok(removed)
}
