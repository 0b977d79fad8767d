// src/persistence.rs

//! Failure-absorbing persistence for study tables.
//!
//! Storage problems (unopenable file, locked or full disk, corrupt JSON) are
//! logged and swallowed here. Reads fall back to empty tables, as if this were
//! the learner's first session; writes are dropped. Callers never see a
//! storage error, only a session whose progress may not survive a restart.

use crate::database;
use crate::error::StorageError;
use crate::models::CollectionId;
use crate::pedagogy::{TopicStats, WrongCounts};
use crate::repository;
use crate::scheduler::ReviewTable;
use log::{debug, warn};
use rusqlite::Connection;
use std::path::Path;

pub struct Persistence {
    conn: Option<Connection>,
}

impl Persistence {
    /// Opens a file-backed store, degrading to ephemeral mode on failure.
    pub fn open(path: &Path) -> Self {
        match database::open(path) {
            Ok(conn) => Persistence { conn: Some(conn) },
            Err(e) => {
                warn!(
                    "[Storage] Could not open {:?}: {}. Review progress for this session will not be saved.",
                    path, e
                );
                Self::ephemeral()
            }
        }
    }

    /// Wraps an existing connection, ensuring the schema.
    pub fn from_connection(conn: Connection) -> Self {
        match database::init_db(&conn) {
            Ok(()) => Persistence { conn: Some(conn) },
            Err(e) => {
                warn!("[Storage] Schema check failed: {}. Falling back to memory.", e);
                Self::ephemeral()
            }
        }
    }

    /// No backing store at all; every read is empty and every write a no-op.
    pub fn ephemeral() -> Self {
        debug!("[Storage] Running without persistence");
        Persistence { conn: None }
    }

    pub fn is_durable(&self) -> bool {
        self.conn.is_some()
    }

    // --- Restore ---

    pub fn load_reviews(&self, collection: &CollectionId) -> ReviewTable {
        self.load("review table", collection, repository::load_review_table)
    }

    pub fn load_wrong_counts(&self, collection: &CollectionId) -> WrongCounts {
        self.load("wrong counts", collection, repository::load_wrong_counts)
    }

    pub fn load_topic_stats(&self, collection: &CollectionId) -> TopicStats {
        self.load("topic stats", collection, repository::load_topic_stats)
    }

    // --- Snapshot (write-through) ---

    pub fn save_reviews(&self, collection: &CollectionId, table: &ReviewTable) -> bool {
        self.save("review table", collection, |conn, c| {
            repository::save_review_table(conn, c, table)
        })
    }

    pub fn save_wrong_counts(&self, collection: &CollectionId, counts: &WrongCounts) -> bool {
        self.save("wrong counts", collection, |conn, c| {
            repository::save_wrong_counts(conn, c, counts)
        })
    }

    pub fn save_topic_stats(&self, collection: &CollectionId, stats: &TopicStats) -> bool {
        self.save("topic stats", collection, |conn, c| {
            repository::save_topic_stats(conn, c, stats)
        })
    }

    pub fn forget(&self, collection: &CollectionId) -> bool {
        self.save("collection", collection, |conn, c| {
            let removed = repository::delete_collection(conn, c)?;
            debug!("[Storage] Removed {} keys for {}", removed, c);
            Ok(())
        })
    }

    // --- Internals ---

    fn load<T: Default>(
        &self,
        what: &str,
        collection: &CollectionId,
        read: impl FnOnce(&Connection, &CollectionId) -> Result<T, StorageError>,
    ) -> T {
        let Some(conn) = &self.conn else {
            return T::default();
        };
        match read(conn, collection) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "[Storage] Failed to restore {} for {}: {}. Starting fresh.",
                    what, collection, e
                );
                T::default()
            }
        }
    }

    /// Returns whether the write reached storage.
    fn save(
        &self,
        what: &str,
        collection: &CollectionId,
        write: impl FnOnce(&Connection, &CollectionId) -> Result<(), StorageError>,
    ) -> bool {
        let Some(conn) = &self.conn else {
            return false;
        };
        match write(conn, collection) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "[Storage] Failed to save {} for {}: {}. Progress may not be saved.",
                    what, collection, e
                );
                false
            }
        }
    }

    #[cfg(test)]
    fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }
}
