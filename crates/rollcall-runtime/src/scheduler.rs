//! Recurring audit tasks, one per tracked conversation.
//!
//! Each task owns a child of the scheduler's root [`CancellationToken`].
//! Every tick's audit runs in its own spawned task and is awaited there, so
//! a panicking audit surfaces as a logged `JoinError` and the conversation
//! stays scheduled. Cancellation is checked between ticks only: an audit in
//! flight runs to completion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rollcall_core::ConversationId;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::traits::AuditRunner;

/// Default time allowed for in-flight audits during shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

struct AuditTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the recurring audit task of every tracked conversation.
pub struct AuditScheduler {
    runner: Arc<dyn AuditRunner>,
    root: CancellationToken,
    tasks: Mutex<HashMap<ConversationId, AuditTask>>,
}

impl AuditScheduler {
    /// Create a scheduler driving `runner`.
    pub fn new(runner: Arc<dyn AuditRunner>) -> Self {
        Self {
            runner,
            root: CancellationToken::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Arm a recurring audit for `id`. The first tick fires one full
    /// `interval` from now. Returns `false` (and does nothing) if a task for
    /// `id` already exists or the interval does not fit the clock.
    pub fn start(&self, id: ConversationId, interval: Duration) -> bool {
        let mut tasks = self.tasks.lock();
        if tasks.contains_key(&id) {
            debug!(chat_id = id.get(), "audit task already active");
            return false;
        }

        let Some(first_tick) = Instant::now().checked_add(interval) else {
            warn!(chat_id = id.get(), ?interval, "audit interval out of range, not scheduling");
            return false;
        };
        let cancel = self.root.child_token();
        let handle = tokio::spawn(run_audit_loop(
            id,
            first_tick,
            interval,
            Arc::clone(&self.runner),
            cancel.clone(),
        ));
        let _ = tasks.insert(id, AuditTask { cancel, handle });
        info!(chat_id = id.get(), interval_secs = interval.as_secs(), "audit task started");
        true
    }

    /// Cancel the task for `id`. Returns whether one was registered.
    pub fn stop(&self, id: ConversationId) -> bool {
        let Some(task) = self.tasks.lock().remove(&id) else {
            return false;
        };
        task.cancel.cancel();
        info!(chat_id = id.get(), "audit task stopped");
        true
    }

    /// Whether a task is registered for `id`.
    #[must_use]
    pub fn is_active(&self, id: ConversationId) -> bool {
        self.tasks.lock().contains_key(&id)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Conversations with a registered task, sorted.
    #[must_use]
    pub fn active_ids(&self) -> Vec<ConversationId> {
        let mut ids: Vec<_> = self.tasks.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Cancel every task and wait up to `timeout` for in-flight audits.
    pub async fn shutdown_all(&self, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        self.root.cancel();

        let handles: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .drain()
            .map(|(_, task)| task.handle)
            .collect();
        info!(task_count = handles.len(), "stopping audit tasks");

        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!("audit shutdown timed out after {timeout:?}");
        }
    }
}

impl std::fmt::Debug for AuditScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditScheduler")
            .field("active_count", &self.active_count())
            .finish_non_exhaustive()
    }
}

async fn run_audit_loop(
    id: ConversationId,
    first_tick: Instant,
    interval: Duration,
    runner: Arc<dyn AuditRunner>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let runner = Arc::clone(&runner);
        let tick = tokio::spawn(async move { runner.run_audit(id).await });
        match tick.await {
            Ok(Ok(outcome)) => debug!(chat_id = id.get(), ?outcome, "audit tick complete"),
            Ok(Err(e)) => warn!(chat_id = id.get(), error = %e, "audit tick failed"),
            Err(e) => warn!(chat_id = id.get(), error = %e, "audit tick panicked"),
        }
    }

    debug!(chat_id = id.get(), "audit loop exited");
}
