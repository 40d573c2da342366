//! Startup reconciliation from the durable store.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::errors::Result;
use crate::registry::MembershipRegistry;
use crate::scheduler::AuditScheduler;
use crate::traits::StateStore;

/// Counts from one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Conversations restored into the registry.
    pub restored: usize,
    /// Audit tasks newly armed.
    pub armed: usize,
}

/// Rebuilds the registry and audit tasks from the store.
pub struct BootstrapReconciler {
    store: Arc<dyn StateStore>,
    registry: Arc<MembershipRegistry>,
    scheduler: Arc<AuditScheduler>,
    interval: Duration,
}

impl BootstrapReconciler {
    /// Create a reconciler.
    pub fn new(
        store: Arc<dyn StateStore>,
        registry: Arc<MembershipRegistry>,
        scheduler: Arc<AuditScheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            scheduler,
            interval,
        }
    }

    /// Restore every tracked conversation with its roster and arm its audit.
    ///
    /// Idempotent: a second pass re-reads rosters and arms nothing new.
    pub async fn reconcile(&self) -> Result<BootstrapReport> {
        self.store.ensure_schema().await?;
        let ids = self.store.list_tracked().await?;

        let mut report = BootstrapReport::default();
        for id in ids {
            let roster = self.store.roster_of(id).await?;
            self.registry.restore(id, roster);
            report.restored += 1;
            if self.scheduler.start(id, self.interval) {
                report.armed += 1;
            }
        }

        info!(
            restored = report.restored,
            armed = report.armed,
            "tracked conversations restored"
        );
        Ok(report)
    }
}
