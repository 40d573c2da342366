//! Ports the runtime depends on.
//!
//! The binary provides concrete implementations (SQLite store, Bot API
//! transport); tests use in-memory fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use rollcall_core::{Conversation, ConversationId, UserId};

use crate::audit::AuditOutcome;
use crate::errors::{Result, TransportError};

/// A conversation administrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Administrator {
    /// User identifier, used as the direct-message target.
    pub user_id: UserId,
    /// Public username.
    pub username: Option<String>,
    /// First name, used when there is no username.
    pub first_name: String,
    /// Bot accounts never receive reports.
    pub is_bot: bool,
}

impl Administrator {
    /// Name used in the report greeting.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

/// Outcome of loading an allow-list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names newly inserted.
    pub inserted: usize,
    /// Blank or already-present names.
    pub skipped: usize,
}

/// Chat transport operations.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a private message to a user.
    async fn send_direct_message(&self, user: UserId, text: &str)
    -> std::result::Result<(), TransportError>;

    /// Administrators of a conversation.
    async fn list_administrators(
        &self,
        conversation: ConversationId,
    ) -> std::result::Result<Vec<Administrator>, TransportError>;

    /// Current descriptor of a conversation.
    async fn get_conversation(
        &self,
        conversation: ConversationId,
    ) -> std::result::Result<Conversation, TransportError>;

    /// Download an uploaded document.
    async fn download_document(&self, file_id: &str)
    -> std::result::Result<Vec<u8>, TransportError>;
}

/// Durable tracked-conversation and roster records.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Create the tracked and roster tables if missing.
    async fn ensure_schema(&self) -> Result<()>;
    /// Persist a tracked record. Returns `false` if it already existed.
    async fn track(&self, id: ConversationId) -> Result<bool>;
    /// Delete a tracked record. Returns whether one existed.
    async fn untrack(&self, id: ConversationId) -> Result<bool>;
    /// All tracked conversations.
    async fn list_tracked(&self) -> Result<Vec<ConversationId>>;
    /// Persist a roster entry. Returns `false` if it already existed.
    async fn add_member(&self, id: ConversationId, handle: &str) -> Result<bool>;
    /// Delete a roster entry. Returns whether one existed.
    async fn remove_member(&self, id: ConversationId, handle: &str) -> Result<bool>;
    /// Persisted roster of a conversation.
    async fn roster_of(&self, id: ConversationId) -> Result<Vec<String>>;
}

/// Per-conversation allow-lists.
#[async_trait]
pub trait AllowListStore: Send + Sync {
    /// Whether the conversation has an allow-list.
    async fn has_list(&self, id: ConversationId) -> Result<bool>;
    /// The subset of `candidates` present in the allow-list, or `None` if
    /// the conversation has no allow-list.
    async fn allowed_among(
        &self,
        id: ConversationId,
        candidates: &[String],
    ) -> Result<Option<BTreeSet<String>>>;
    /// Create the list if missing and add every non-blank new name.
    async fn load(&self, id: ConversationId, names: Vec<String>) -> Result<LoadReport>;
}

/// One audit tick for a conversation.
#[async_trait]
pub trait AuditRunner: Send + Sync {
    /// Audit `id` once.
    async fn run_audit(&self, id: ConversationId) -> Result<AuditOutcome>;
}
