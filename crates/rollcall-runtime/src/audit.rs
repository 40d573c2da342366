//! One audit tick: roster minus allow-list, reported to administrators.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use rollcall_core::ConversationId;
use tracing::{debug, info, instrument, warn};

use crate::errors::Result;
use crate::notifier::NotificationDispatcher;
use crate::registry::MembershipRegistry;
use crate::traits::{AllowListStore, AuditRunner};

/// What a single audit tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The conversation has no allow-list; nothing checked.
    NoAllowList,
    /// No roster is known for the conversation.
    RosterUninitialized,
    /// Every roster member is allow-listed.
    Clean,
    /// Denied members were reported.
    Reported {
        /// Denied handles, sorted.
        denied: Vec<String>,
        /// Administrators reached.
        delivered: usize,
        /// Administrators whose delivery failed.
        failed: usize,
    },
}

/// Roster members absent from the allow-list, deduplicated and sorted.
pub fn denied_members<'a, I>(roster: I, allowed: &BTreeSet<String>) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    roster
        .into_iter()
        .filter(|handle| !allowed.contains(*handle))
        .map(str::to_owned)
        .collect()
}

/// Runs audits against the registry and allow-list store.
pub struct AuditEngine {
    registry: Arc<MembershipRegistry>,
    allow_lists: Arc<dyn AllowListStore>,
    notifier: NotificationDispatcher,
}

impl AuditEngine {
    /// Create an engine.
    pub fn new(
        registry: Arc<MembershipRegistry>,
        allow_lists: Arc<dyn AllowListStore>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            registry,
            allow_lists,
            notifier,
        }
    }
}

#[async_trait]
impl AuditRunner for AuditEngine {
    #[instrument(skip(self), fields(chat_id = id.get()))]
    async fn run_audit(&self, id: ConversationId) -> Result<AuditOutcome> {
        if !self.allow_lists.has_list(id).await? {
            debug!("no allow-list, skipping");
            return Ok(AuditOutcome::NoAllowList);
        }

        let Some(roster) = self.registry.roster(id) else {
            warn!("roster uninitialized for tracked conversation");
            return Ok(AuditOutcome::RosterUninitialized);
        };

        let candidates: Vec<String> = roster.iter().cloned().collect();
        let Some(allowed) = self.allow_lists.allowed_among(id, &candidates).await? else {
            debug!("allow-list removed during audit, skipping");
            return Ok(AuditOutcome::NoAllowList);
        };
        let denied = denied_members(roster.iter().map(String::as_str), &allowed);
        if denied.is_empty() {
            debug!(members = roster.len(), "roster matches allow-list");
            return Ok(AuditOutcome::Clean);
        }

        info!(denied = denied.len(), "members missing from allow-list");
        let summary = self.notifier.notify(id, &denied).await?;
        Ok(AuditOutcome::Reported {
            denied: denied.into_iter().collect(),
            delivered: summary.delivered,
            failed: summary.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeAllowLists, FakeTransport, admin, bot_admin};
    use assert_matches::assert_matches;
    use rollcall_core::UserId;

    const CHAT: ConversationId = ConversationId::new(-100_555);

    struct Harness {
        registry: Arc<MembershipRegistry>,
        allow_lists: Arc<FakeAllowLists>,
        transport: Arc<FakeTransport>,
        engine: AuditEngine,
    }

    fn harness() -> Harness {
        let registry = Arc::new(MembershipRegistry::new());
        let allow_lists = Arc::new(FakeAllowLists::new());
        let transport = Arc::new(FakeTransport::new());
        transport.set_admins(CHAT, vec![admin(10, "root"), bot_admin(11)]);
        let engine = AuditEngine::new(
            Arc::clone(&registry),
            allow_lists.clone(),
            NotificationDispatcher::new(transport.clone()),
        );
        Harness {
            registry,
            allow_lists,
            transport,
            engine,
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn duplicates_in_roster_are_reported_once() {
        let denied = denied_members(["alice", "bob", "alice"], &set(&["alice"]));
        assert_eq!(denied, set(&["bob"]));
    }

    #[test]
    fn subset_roster_has_no_denied() {
        assert!(denied_members(["a", "b"], &set(&["a", "b", "c"])).is_empty());
    }

    #[tokio::test]
    async fn missing_allow_list_skips_silently() {
        let h = harness();
        h.registry.restore(CHAT, ["x".to_string()]);
        let outcome = h.engine.run_audit(CHAT).await.unwrap();
        assert_eq!(outcome, AuditOutcome::NoAllowList);
        assert!(h.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn allow_list_dropped_mid_audit_reports_nobody() {
        let h = harness();
        h.registry.restore(CHAT, ["x".to_string(), "y".to_string()]);
        h.allow_lists.insert(CHAT, &["x"]);
        h.allow_lists.drop_after_existence_check(true);

        let outcome = h.engine.run_audit(CHAT).await.unwrap();
        assert_eq!(outcome, AuditOutcome::NoAllowList);
        assert!(h.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_roster_is_reported_as_uninitialized() {
        let h = harness();
        h.allow_lists.insert(CHAT, &["x"]);
        let outcome = h.engine.run_audit(CHAT).await.unwrap();
        assert_eq!(outcome, AuditOutcome::RosterUninitialized);
        assert!(h.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn clean_roster_sends_nothing() {
        let h = harness();
        h.allow_lists.insert(CHAT, &["x", "y"]);
        h.registry.restore(CHAT, ["x".to_string()]);
        assert_eq!(h.engine.run_audit(CHAT).await.unwrap(), AuditOutcome::Clean);
        assert!(h.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn denied_members_reported_to_human_admins() {
        let h = harness();
        h.allow_lists.insert(CHAT, &["x"]);
        h.registry.restore(CHAT, ["x".to_string(), "y".to_string()]);

        let outcome = h.engine.run_audit(CHAT).await.unwrap();
        assert_matches!(
            outcome,
            AuditOutcome::Reported { ref denied, delivered: 1, failed: 0 } if denied == &["y"]
        );
        let sent = h.transport.sent_to(UserId::new(10));
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\n1. y"));
        assert!(h.transport.sent_to(UserId::new(11)).is_empty());
    }

    #[tokio::test]
    async fn allow_list_failure_propagates() {
        let h = harness();
        h.allow_lists.insert(CHAT, &["x"]);
        h.allow_lists.fail_reads(true);
        h.registry.restore(CHAT, ["y".to_string()]);
        assert!(h.engine.run_audit(CHAT).await.is_err());
    }
}
