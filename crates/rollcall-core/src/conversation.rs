//! Conversation descriptor as seen by the membership tracker.

use serde::{Deserialize, Serialize};

use crate::ids::ConversationId;

/// Kind of conversation, mirroring the Bot API `Chat.type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// One-to-one dialog with a user.
    Private,
    /// Basic group.
    Group,
    /// Supergroup.
    Supergroup,
    /// Broadcast channel.
    Channel,
}

impl ConversationKind {
    /// Whether the agent audits conversations of this kind.
    ///
    /// Private dialogs have no roster worth auditing.
    #[must_use]
    pub const fn is_auditable(self) -> bool {
        !matches!(self, Self::Private)
    }

    /// Human-readable noun used in log lines.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Private => "private chat",
            Self::Group | Self::Supergroup => "group",
            Self::Channel => "channel",
        }
    }
}

/// A conversation the agent has observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Transport identifier.
    pub id: ConversationId,
    /// Conversation kind.
    pub kind: ConversationKind,
    /// Display title (absent for private chats).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Public `@username`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Conversation {
    /// Label shown to administrators: the public username when set,
    /// otherwise the title, otherwise the numeric ID.
    #[must_use]
    pub fn label(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Title for log lines.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("<untitled>")
    }
}
