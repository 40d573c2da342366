//! Error types for the Bot API client.

use thiserror::Error;

/// Errors returned by [`BotApi`](crate::BotApi) calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Transport-level failure. The URL is stripped so the token never
    /// reaches logs.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`.
    #[error("bot api error {code}: {description}")]
    Api {
        /// `error_code` from the response.
        code: i64,
        /// `description` from the response.
        description: String,
        /// Seconds to wait before retrying, when flood control kicked in.
        retry_after: Option<u64>,
    },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl TelegramError {
    /// Whether retrying the same call later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { code, .. } => *code == 429 || *code >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, TelegramError>;
