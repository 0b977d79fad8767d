// src/database.rs

use crate::error::StorageError;
use log::{debug, info};
use rusqlite::{Connection, Result};
use std::fs;
use std::path::Path;

/// Opens (creating if needed) the database file and ensures the schema.
pub fn open(path: &Path) -> std::result::Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    info!("Database path: {:?}", path);
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> std::result::Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    init_db(&conn)?;
    Ok(conn)
}

/// Creates the key-value table. Safe to call on an existing database.
pub fn init_db(conn: &Connection) -> Result<()> {
    debug!("[Storage] init_db: Checking database schema...");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )?;

    Ok(())
}
