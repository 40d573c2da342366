//! Bot API HTTP client.
//!
//! Every method is a JSON `POST` to `{base}/bot{token}/{method}`. File
//! downloads use `{base}/file/bot{token}/{file_path}`.

use std::time::Duration;

use rollcall_core::{ConversationId, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::errors::{Result, TelegramError};
use crate::types::{ApiResponse, Chat, ChatMember, File, Message, Update, User};

/// Slack added to the HTTP timeout on top of the long-poll timeout.
const LONG_POLL_SLACK: Duration = Duration::from_secs(10);

/// Default timeout for ordinary calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bot API client.
#[derive(Clone)]
pub struct BotApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BotApi {
    /// Create a client with a fresh `reqwest::Client`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Create a client sharing an existing `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{method}", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
            TelegramError::Decode(format!("{method} (http {}): {e}", status.as_u16()))
        })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
                retry_after: envelope.parameters.and_then(|p| p.retry_after),
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method}: ok response without result")))
    }

    /// `getMe`.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({}), DEFAULT_TIMEOUT).await
    }

    /// `getUpdates` with long polling.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
        allowed_updates: &[&str],
    ) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": allowed_updates,
        });
        self.call("getUpdates", &body, timeout + LONG_POLL_SLACK)
            .await
    }

    /// `sendMessage` to a chat or user.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        debug!(chat_id, len = text.len(), "sendMessage");
        let body = json!({ "chat_id": chat_id, "text": text });
        self.call("sendMessage", &body, DEFAULT_TIMEOUT).await
    }

    /// `sendMessage` addressed to a user's private chat.
    pub async fn send_direct_message(&self, user: UserId, text: &str) -> Result<Message> {
        self.send_message(user.get(), text).await
    }

    /// `getChatAdministrators`.
    pub async fn get_chat_administrators(&self, chat: ConversationId) -> Result<Vec<ChatMember>> {
        let body = json!({ "chat_id": chat.get() });
        self.call("getChatAdministrators", &body, DEFAULT_TIMEOUT)
            .await
    }

    /// `getChat`.
    pub async fn get_chat(&self, chat: ConversationId) -> Result<Chat> {
        let body = json!({ "chat_id": chat.get() });
        self.call("getChat", &body, DEFAULT_TIMEOUT).await
    }

    /// `getFile`.
    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        let body = json!({ "file_id": file_id });
        self.call("getFile", &body, DEFAULT_TIMEOUT).await
    }

    /// Download a file by the `file_path` returned from [`get_file`](Self::get_file).
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/file/bot{}/{file_path}", self.base_url, self.token);
        let response = self
            .client
            .get(&url)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Api {
                code: i64::from(status.as_u16()),
                description: format!("file download failed for {file_path}"),
                retry_after: None,
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;
        Ok(bytes.to_vec())
    }

    /// Resolve a `file_id` and download its content.
    pub async fn download_document(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.get_file(file_id).await?;
        let path = file
            .file_path
            .ok_or_else(|| TelegramError::Decode(format!("getFile: no file_path for {file_id}")))?;
        self.download_file(&path).await
    }
}
