//! `StateStore` and `AllowListStore` backed by [`RollcallStore`].
//!
//! Every call runs on the blocking thread pool.

use std::collections::BTreeSet;

use async_trait::async_trait;
use rollcall_core::ConversationId;
use rollcall_runtime::errors::{Result, RuntimeError};
use rollcall_runtime::traits::{AllowListStore, LoadReport, StateStore};
use rollcall_store::RollcallStore;

async fn blocking<T, F>(store: &RollcallStore, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&RollcallStore) -> rollcall_store::Result<T> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| RuntimeError::Task(e.to_string()))?
        .map_err(|e| RuntimeError::Store(e.to_string()))
}

/// Tracked conversations and rosters in `SQLite`.
#[derive(Clone)]
pub struct SqliteStateStore {
    store: RollcallStore,
}

impl SqliteStateStore {
    /// Wrap a store.
    pub fn new(store: RollcallStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn ensure_schema(&self) -> Result<()> {
        blocking(&self.store, RollcallStore::migrate).await
    }

    async fn track(&self, id: ConversationId) -> Result<bool> {
        blocking(&self.store, move |s| s.track(id)).await
    }

    async fn untrack(&self, id: ConversationId) -> Result<bool> {
        blocking(&self.store, move |s| s.untrack(id)).await
    }

    async fn list_tracked(&self) -> Result<Vec<ConversationId>> {
        blocking(&self.store, RollcallStore::list_tracked).await
    }

    async fn add_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        let handle = handle.to_string();
        blocking(&self.store, move |s| s.add_member(id, &handle)).await
    }

    async fn remove_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        let handle = handle.to_string();
        blocking(&self.store, move |s| s.remove_member(id, &handle)).await
    }

    async fn roster_of(&self, id: ConversationId) -> Result<Vec<String>> {
        blocking(&self.store, move |s| s.roster_of(id)).await
    }
}

/// Per-conversation allow-list tables in `SQLite`.
#[derive(Clone)]
pub struct SqliteAllowLists {
    store: RollcallStore,
}

impl SqliteAllowLists {
    /// Wrap a store.
    pub fn new(store: RollcallStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AllowListStore for SqliteAllowLists {
    async fn has_list(&self, id: ConversationId) -> Result<bool> {
        blocking(&self.store, move |s| s.has_allow_list(id)).await
    }

    async fn allowed_among(
        &self,
        id: ConversationId,
        candidates: &[String],
    ) -> Result<Option<BTreeSet<String>>> {
        let candidates = candidates.to_vec();
        blocking(&self.store, move |s| s.allowed_among(id, &candidates)).await
    }

    async fn load(&self, id: ConversationId, names: Vec<String>) -> Result<LoadReport> {
        let summary = blocking(&self.store, move |s| s.load_allow_list(id, &names)).await?;
        Ok(LoadReport {
            inserted: summary.inserted,
            skipped: summary.skipped,
        })
    }
}
