//! Component wiring shared by the binary and the integration tests.

use std::sync::Arc;
use std::time::Duration;

use rollcall_runtime::{
    AuditEngine, AuditScheduler, BootstrapReconciler, ChatTransport, CommandRouter,
    ConversationTracker, MembershipRegistry, NotificationDispatcher,
};
use rollcall_store::RollcallStore;

use crate::dispatch::UpdateDispatcher;
use crate::providers::{SqliteAllowLists, SqliteStateStore};

/// The assembled agent.
pub struct Rollcall {
    /// Tracked set and rosters.
    pub registry: Arc<MembershipRegistry>,
    /// Periodic audit tasks.
    pub scheduler: Arc<AuditScheduler>,
    /// Audit tick implementation.
    pub engine: Arc<AuditEngine>,
    /// Update fan-out.
    pub dispatcher: Arc<UpdateDispatcher>,
    /// Startup reconciliation.
    pub bootstrap: BootstrapReconciler,
}

impl Rollcall {
    /// Wire every component over one store and one transport.
    pub fn assemble(
        store: RollcallStore,
        transport: Arc<dyn ChatTransport>,
        interval: Duration,
    ) -> Self {
        let state = Arc::new(SqliteStateStore::new(store.clone()));
        let allow_lists = Arc::new(SqliteAllowLists::new(store));
        let registry = Arc::new(MembershipRegistry::new());

        let engine = Arc::new(AuditEngine::new(
            Arc::clone(&registry),
            allow_lists.clone(),
            NotificationDispatcher::new(Arc::clone(&transport)),
        ));
        let scheduler = Arc::new(AuditScheduler::new(engine.clone()));

        let tracker = Arc::new(ConversationTracker::new(
            Arc::clone(&registry),
            state.clone(),
            Arc::clone(&scheduler),
            interval,
        ));
        let commands = Arc::new(CommandRouter::new(
            Arc::clone(&registry),
            transport,
            allow_lists,
        ));
        let bootstrap = BootstrapReconciler::new(
            state,
            Arc::clone(&registry),
            Arc::clone(&scheduler),
            interval,
        );

        Self {
            registry,
            scheduler,
            engine,
            dispatcher: Arc::new(UpdateDispatcher::new(tracker, commands)),
            bootstrap,
        }
    }
}
