//! [`ChatTransport`] over the Bot API client.

use async_trait::async_trait;
use rollcall_core::{Conversation, ConversationId, UserId};
use rollcall_runtime::errors::TransportError;
use rollcall_runtime::traits::{Administrator, ChatTransport};
use rollcall_telegram::{BotApi, ChatMember, TelegramError};

/// Bot API transport.
#[derive(Clone, Debug)]
pub struct TelegramTransport {
    api: BotApi,
}

impl TelegramTransport {
    /// Wrap a client.
    pub fn new(api: BotApi) -> Self {
        Self { api }
    }
}

fn transport_error(err: TelegramError) -> TransportError {
    if err.is_retryable() {
        return TransportError::Unavailable(err.to_string());
    }
    match err {
        TelegramError::Api {
            code, description, ..
        } => TransportError::Rejected { code, description },
        TelegramError::Decode(message) => TransportError::Malformed(message),
        TelegramError::Http(e) => TransportError::Unavailable(e.to_string()),
    }
}

fn administrator(member: ChatMember) -> Administrator {
    Administrator {
        user_id: member.user.id,
        username: member.user.username,
        first_name: member.user.first_name,
        is_bot: member.user.is_bot,
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_direct_message(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        let _ = self
            .api
            .send_direct_message(user, text)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn list_administrators(
        &self,
        conversation: ConversationId,
    ) -> Result<Vec<Administrator>, TransportError> {
        let members = self
            .api
            .get_chat_administrators(conversation)
            .await
            .map_err(transport_error)?;
        Ok(members.into_iter().map(administrator).collect())
    }

    async fn get_conversation(
        &self,
        conversation: ConversationId,
    ) -> Result<Conversation, TransportError> {
        let chat = self.api.get_chat(conversation).await.map_err(transport_error)?;
        Ok(chat.to_conversation())
    }

    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        self.api
            .download_document(file_id)
            .await
            .map_err(transport_error)
    }
}
