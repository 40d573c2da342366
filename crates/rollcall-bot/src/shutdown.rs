//! Graceful shutdown via `CancellationToken`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::Rollcall;

/// Default wait for each shutdown stage.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Stops the poller, in-flight commands and audit tasks, in that order.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    timeout: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator waiting up to `timeout` per stage.
    pub fn new(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// Token the update poller watches.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal shutdown without waiting.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been signalled.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel polling and wind down every component.
    pub async fn graceful_shutdown(&self, poller: JoinHandle<()>, app: &Rollcall) {
        self.shutdown();

        match tokio::time::timeout(self.timeout, poller).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "update poller ended abnormally"),
            Err(_) => warn!("update poller did not stop within {:?}", self.timeout),
        }

        app.dispatcher.drain(self.timeout).await;
        app.scheduler.shutdown_all(Some(self.timeout)).await;
        info!("shutdown complete");
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_SHUTDOWN_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rollcall_core::{Conversation, ConversationId, UserId};
    use rollcall_runtime::{Administrator, ChatTransport, TransportError};
    use rollcall_store::RollcallStore;
    use std::sync::Arc;

    struct SilentTransport;

    #[async_trait]
    impl ChatTransport for SilentTransport {
        async fn send_direct_message(&self, _: UserId, _: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn list_administrators(
            &self,
            _: ConversationId,
        ) -> Result<Vec<Administrator>, TransportError> {
            Ok(Vec::new())
        }

        async fn get_conversation(
            &self,
            id: ConversationId,
        ) -> Result<Conversation, TransportError> {
            Err(TransportError::Rejected {
                code: 400,
                description: format!("chat {id} not found"),
            })
        }

        async fn download_document(&self, _: &str) -> Result<Vec<u8>, TransportError> {
            Ok(Vec::new())
        }
    }

    fn app() -> Rollcall {
        Rollcall::assemble(
            RollcallStore::in_memory().unwrap(),
            Arc::new(SilentTransport),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn shutdown_cancels_token() {
        let coord = ShutdownCoordinator::default();
        let token = coord.token();
        assert!(!coord.is_shutting_down());
        coord.shutdown();
        coord.shutdown();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn graceful_shutdown_stops_poller_and_audits() {
        let app = app();
        let _ = app.scheduler.start(ConversationId::new(-100_555), Duration::from_secs(3600));
        let coord = ShutdownCoordinator::new(Duration::from_secs(1));
        let token = coord.token();
        let poller = tokio::spawn(async move { token.cancelled().await });

        coord.graceful_shutdown(poller, &app).await;
        assert!(coord.is_shutting_down());
        assert_eq!(app.scheduler.active_count(), 0);
    }

    #[tokio::test]
    async fn stuck_poller_times_out() {
        let app = app();
        let coord = ShutdownCoordinator::new(Duration::from_millis(50));
        let poller = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });

        coord.graceful_shutdown(poller, &app).await;
        assert!(coord.is_shutting_down());
    }
}
