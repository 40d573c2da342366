//! Bot API wire types.
//!
//! Only the fields rollcall reads are modelled; unknown fields are ignored.

use rollcall_core::{
    Conversation, ConversationId, ConversationKind, MemberSnapshot, MemberStatus, StatusChange,
    UserId,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Update kinds requested from `getUpdates`.
pub const ALLOWED_UPDATES: &[&str] = &["message", "my_chat_member", "chat_member"];

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Payload when `ok`.
    pub result: Option<T>,
    /// Error text when not `ok`.
    pub description: Option<String>,
    /// Error code when not `ok`.
    pub error_code: Option<i64>,
    /// Extra error parameters.
    pub parameters: Option<ResponseParameters>,
}

/// `ResponseParameters` object.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseParameters {
    /// Flood-control wait, in seconds.
    pub retry_after: Option<u64>,
}

/// Incoming update.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    pub update_id: i64,
    /// New message.
    pub message: Option<Message>,
    /// The bot's own membership changed.
    pub my_chat_member: Option<ChatMemberUpdated>,
    /// Another member's membership changed.
    pub chat_member: Option<ChatMemberUpdated>,
}

/// Telegram user or bot.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Whether this is a bot account.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Public username without `@`.
    pub username: Option<String>,
}

/// Chat descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: ConversationId,
    /// Chat type.
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    /// Title of groups and channels.
    pub title: Option<String>,
    /// Public username.
    pub username: Option<String>,
}

impl Chat {
    /// Convert to the domain conversation descriptor.
    #[must_use]
    pub fn to_conversation(&self) -> Conversation {
        Conversation {
            id: self.id,
            kind: self.kind,
            title: self.title.clone(),
            username: self.username.clone(),
        }
    }
}

/// Incoming message.
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    pub message_id: i64,
    /// Sender.
    pub from: Option<User>,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Text body.
    pub text: Option<String>,
    /// Attached document.
    pub document: Option<Document>,
}

/// Attached file.
#[derive(Clone, Debug, Deserialize)]
pub struct Document {
    /// Identifier used with `getFile`.
    pub file_id: String,
    /// Original file name.
    pub file_name: Option<String>,
    /// MIME type as sent by the client.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub file_size: Option<u64>,
}

/// Result of `getFile`.
#[derive(Clone, Debug, Deserialize)]
pub struct File {
    /// File identifier.
    pub file_id: String,
    /// Path for the download endpoint.
    pub file_path: Option<String>,
    /// Size in bytes.
    pub file_size: Option<u64>,
}

/// Chat member as returned by `getChatAdministrators` and membership updates.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatMember {
    /// Status; `None` when missing or not recognised.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<MemberStatus>,
    /// The member.
    pub user: User,
    /// Membership flag, present for restricted members.
    pub is_member: Option<bool>,
}

impl ChatMember {
    /// Status snapshot for the transition rule.
    #[must_use]
    pub fn snapshot(&self) -> MemberSnapshot {
        MemberSnapshot {
            status: self.status,
            is_member: self.is_member,
        }
    }
}

/// `chat_member` / `my_chat_member` payload.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat the change happened in.
    pub chat: Chat,
    /// Who performed the change.
    pub from: User,
    /// State before.
    pub old_chat_member: ChatMember,
    /// State after.
    pub new_chat_member: ChatMember,
}

impl ChatMemberUpdated {
    /// Before/after snapshot.
    #[must_use]
    pub fn status_change(&self) -> StatusChange {
        StatusChange::new(self.old_chat_member.snapshot(), self.new_chat_member.snapshot())
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<MemberStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| serde_json::from_value(serde_json::Value::String(s)).ok()))
}
