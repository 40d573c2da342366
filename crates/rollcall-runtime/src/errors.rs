//! Error types at the runtime's port boundary.

use thiserror::Error;

/// Failure reported by a [`ChatTransport`](crate::traits::ChatTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote side rejected the call (blocked bot, unknown chat, ...).
    #[error("rejected ({code}): {description}")]
    Rejected {
        /// Transport error code.
        code: i64,
        /// Human-readable reason.
        description: String,
    },

    /// Network or server failure; retrying later may succeed.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors surfaced by runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Durable store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Chat transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A blocking task was cancelled or panicked.
    #[error("task failed: {0}")]
    Task(String),
}

/// Convenience alias for runtime results.
pub type Result<T> = std::result::Result<T, RuntimeError>;
