//! SQL DDL for the tracked-conversation and roster tables.
//!
//! Allow-list tables are not created here; one exists per conversation and is
//! created on demand by [`AllowListRepo::load`](crate::repositories::AllowListRepo::load).

use rusqlite::Connection;

use crate::errors::{Result, StoreError};

/// Run all migrations. Idempotent (`IF NOT EXISTS`).
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(|e| StoreError::Migration {
        message: format!("base schema: {e}"),
    })?;
    tracing::debug!("store migrations applied");
    Ok(())
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tracked_conversations (
    id INTEGER PRIMARY KEY,
    chat_id TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS usernames (
    id INTEGER PRIMARY KEY,
    chat_id TEXT NOT NULL,
    username TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_usernames_chat
    ON usernames(chat_id, username);
";
