//! Pool-backed facade over the repositories.
//!
//! Each method is one logical store operation and runs in its own
//! transaction. Methods block; async callers wrap them in `spawn_blocking`.

use std::collections::BTreeSet;
use std::path::Path;

use rollcall_core::ConversationId;

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::errors::Result;
use crate::migrations::run_migrations;
use crate::repositories::{AllowListRepo, LoadSummary, RosterRepo, TrackedRepo};

/// Durable store for tracked conversations, rosters and allow-lists.
#[derive(Clone)]
pub struct RollcallStore {
    pool: ConnectionPool,
}

impl RollcallStore {
    /// Wrap an existing pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Open a file-backed store and run migrations.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        let store = Self::new(connection::new_file(path, config)?);
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store and run migrations (for testing).
    pub fn in_memory() -> Result<Self> {
        let store = Self::new(connection::new_in_memory(&ConnectionConfig::default())?);
        store.migrate()?;
        Ok(store)
    }

    /// Ensure the tracked and roster tables exist.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.pool.get()?;
        run_migrations(&conn)
    }

    /// Persist a tracked record.
    pub fn track(&self, id: ConversationId) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let inserted = TrackedRepo::track(&tx, id)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// Delete a tracked record. Roster rows are kept.
    pub fn untrack(&self, id: ConversationId) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = TrackedRepo::untrack(&tx, id)?;
        tx.commit()?;
        Ok(removed)
    }

    /// All tracked conversation IDs.
    pub fn list_tracked(&self) -> Result<Vec<ConversationId>> {
        let conn = self.pool.get()?;
        TrackedRepo::list(&conn)
    }

    /// Add a roster entry.
    pub fn add_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let added = RosterRepo::add(&tx, id, handle)?;
        tx.commit()?;
        Ok(added)
    }

    /// Remove a roster entry.
    pub fn remove_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = RosterRepo::remove(&tx, id, handle)?;
        tx.commit()?;
        Ok(removed)
    }

    /// Roster of a conversation.
    pub fn roster_of(&self, id: ConversationId) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        RosterRepo::members_of(&conn, id)
    }

    /// Whether an allow-list table exists.
    pub fn has_allow_list(&self, id: ConversationId) -> Result<bool> {
        let conn = self.pool.get()?;
        AllowListRepo::exists(&conn, id)
    }

    /// See [`AllowListRepo::allowed_among`].
    pub fn allowed_among(
        &self,
        id: ConversationId,
        candidates: &[String],
    ) -> Result<Option<BTreeSet<String>>> {
        let conn = self.pool.get()?;
        AllowListRepo::allowed_among(&conn, id, candidates)
    }

    /// Load names into a conversation's allow-list in one transaction.
    pub fn load_allow_list(&self, id: ConversationId, names: &[String]) -> Result<LoadSummary> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let summary = AllowListRepo::load(&tx, id, names)?;
        tx.commit()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollcall.db");
        let id = ConversationId::new(-100_555);
        {
            let store = RollcallStore::open(&path, &ConnectionConfig::default()).unwrap();
            assert!(store.track(id).unwrap());
            assert!(store.add_member(id, "x").unwrap());
            assert!(store.add_member(id, "y").unwrap());
        }
        let store = RollcallStore::open(&path, &ConnectionConfig::default()).unwrap();
        assert_eq!(store.list_tracked().unwrap(), vec![id]);
        assert_eq!(store.roster_of(id).unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn untrack_keeps_roster_rows() {
        let store = RollcallStore::in_memory().unwrap();
        let id = ConversationId::new(-1);
        let _ = store.track(id).unwrap();
        let _ = store.add_member(id, "alice").unwrap();
        assert!(store.untrack(id).unwrap());
        assert!(store.list_tracked().unwrap().is_empty());
        assert_eq!(store.roster_of(id).unwrap(), vec!["alice"]);
    }

    #[test]
    fn allow_list_round_trip() {
        let store = RollcallStore::in_memory().unwrap();
        let id = ConversationId::new(-100_555);
        assert!(!store.has_allow_list(id).unwrap());
        let summary = store
            .load_allow_list(id, &["x".to_string(), String::new()])
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert!(store.has_allow_list(id).unwrap());
        let allowed = store
            .allowed_among(id, &["x".to_string(), "y".to_string()])
            .unwrap()
            .unwrap();
        assert!(allowed.contains("x"));
        assert!(!allowed.contains("y"));
    }
}
