//! Per-conversation allow-list tables.
//!
//! Table names only ever come from [`AllowListTable`], and are re-validated
//! before being spliced (quoted) into SQL.

use std::collections::BTreeSet;

use rollcall_core::{AllowListTable, ConversationId};
use rusqlite::{Connection, params};

use crate::errors::Result;

/// Outcome of loading names into an allow-list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Names newly inserted.
    pub inserted: usize,
    /// Blank lines and names already present.
    pub skipped: usize,
}

/// Allow-list repository.
pub struct AllowListRepo;

impl AllowListRepo {
    fn table(id: ConversationId) -> Result<AllowListTable> {
        let table = AllowListTable::for_conversation(id);
        Ok(AllowListTable::parse(table.as_str())?)
    }

    /// Whether the conversation has an allow-list table.
    pub fn exists(conn: &Connection, id: ConversationId) -> Result<bool> {
        let table = Self::table(id)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// The subset of `candidates` present in the allow-list.
    ///
    /// Returns `None` when the conversation has no allow-list table.
    pub fn allowed_among(
        conn: &Connection,
        id: ConversationId,
        candidates: &[String],
    ) -> Result<Option<BTreeSet<String>>> {
        if !Self::exists(conn, id)? {
            return Ok(None);
        }
        let table = Self::table(id)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT 1 FROM {} WHERE username = ?1 LIMIT 1",
            table.quoted()
        ))?;
        let mut allowed = BTreeSet::new();
        for name in candidates {
            if stmt.exists(params![name])? {
                let _ = allowed.insert(name.clone());
            }
        }
        Ok(Some(allowed))
    }

    /// Create the table if missing and insert each non-blank name not
    /// already present. Names are trimmed.
    pub fn load<S: AsRef<str>>(
        conn: &Connection,
        id: ConversationId,
        names: &[S],
    ) -> Result<LoadSummary> {
        let table = Self::table(id)?;
        let quoted = table.quoted();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {quoted} (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL
            )"
        ))?;

        let mut insert = conn.prepare(&format!(
            "INSERT INTO {quoted} (username)
             SELECT ?1
             WHERE NOT EXISTS (SELECT 1 FROM {quoted} WHERE username = ?1)"
        ))?;

        let mut summary = LoadSummary::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                summary.skipped += 1;
                continue;
            }
            if insert.execute(params![name])? > 0 {
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }
        tracing::debug!(
            chat_id = id.get(),
            table = %table,
            inserted = summary.inserted,
            skipped = summary.skipped,
            "allow-list loaded"
        );
        Ok(summary)
    }
}
