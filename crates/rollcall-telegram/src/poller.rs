//! Long-poll update loop.
//!
//! Updates are handed to the handler one at a time, in `update_id` order,
//! and the offset is advanced past each one before the next poll. Failed
//! polls back off exponentially with jitter; cancellation is honoured both
//! while a poll is in flight and while backing off.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::BotApi;
use crate::errors::TelegramError;
use crate::types::{ALLOWED_UPDATES, Update};

/// Backoff parameters for failed polls.
#[derive(Clone, Debug)]
pub struct BackoffConfig {
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Upper bound on the delay.
    pub max_delay: Duration,
    /// Jitter range, 0.0 to 1.0.
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter_factor: 0.2,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (zero-based).
    ///
    /// `min(max, base * 2^attempt) * (1 + (2 * random - 1) * jitter)`, where
    /// `random` is in `[0, 1)`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay(&self, attempt: u32, random: f64) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let capped = base_ms.saturating_mul(1u64 << attempt.min(31)).min(max_ms);
        let jitter = 1.0 + (random * 2.0 - 1.0) * self.jitter_factor;
        Duration::from_millis(((capped as f64) * jitter).round().max(0.0) as u64)
    }
}

/// Drives `getUpdates` until cancelled.
pub struct UpdatePoller {
    api: BotApi,
    poll_timeout: Duration,
    backoff: BackoffConfig,
    offset: i64,
}

impl UpdatePoller {
    /// Create a poller starting from offset 0.
    pub fn new(api: BotApi, poll_timeout: Duration) -> Self {
        Self {
            api,
            poll_timeout,
            backoff: BackoffConfig::default(),
            offset: 0,
        }
    }

    /// Override the backoff parameters.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Next offset to request.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Poll until `cancel` fires, awaiting `handler` for each update.
    pub async fn run<F, Fut>(&mut self, cancel: CancellationToken, mut handler: F)
    where
        F: FnMut(Update) -> Fut,
        Fut: Future<Output = ()>,
    {
        info!(timeout_secs = self.poll_timeout.as_secs(), "update polling started");
        let mut failures: u32 = 0;

        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                r = self.api.get_updates(self.offset, self.poll_timeout, ALLOWED_UPDATES) => r,
            };

            match result {
                Ok(updates) => {
                    failures = 0;
                    if !updates.is_empty() {
                        debug!(count = updates.len(), offset = self.offset, "received updates");
                    }
                    for update in updates {
                        self.offset = self.offset.max(update.update_id + 1);
                        handler(update).await;
                    }
                }
                Err(e) => {
                    let delay = self.retry_delay(&e, failures);
                    failures = failures.saturating_add(1);
                    warn!(
                        error = %e,
                        attempt = failures,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "getUpdates failed, backing off"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!(offset = self.offset, "update polling stopped");
    }

    fn retry_delay(&self, error: &TelegramError, attempt: u32) -> Duration {
        if let TelegramError::Api {
            retry_after: Some(secs),
            ..
        } = error
        {
            return Duration::from_secs(*secs);
        }
        let random: f64 = rand::rng().random();
        self.backoff.delay(attempt, random)
    }
}
