//! Applies membership-change events to the store, registry and scheduler.
//!
//! The durable write goes first. If it fails the event is dropped with the
//! in-memory state untouched, so memory never runs ahead of the store.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::{Conversation, StatusChange, extract_status_change};
use tracing::{debug, info, instrument, warn};

use crate::errors::Result;
use crate::registry::MembershipRegistry;
use crate::scheduler::AuditScheduler;
use crate::traits::StateStore;

/// Whose membership changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MembershipScope {
    /// The agent itself joined or left.
    Own,
    /// Another member; `handle` is their username, if they have one.
    Member {
        /// Member username.
        handle: Option<String>,
    },
}

/// A membership change observed by the transport.
#[derive(Clone, Debug)]
pub struct MembershipEvent {
    /// Conversation the change happened in.
    pub conversation: Conversation,
    /// Display name of whoever caused the change.
    pub actor: String,
    /// Whose membership changed.
    pub scope: MembershipScope,
    /// Before/after status snapshot.
    pub change: StatusChange,
}

/// What the tracker did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// No membership transition, or not applicable.
    Ignored,
    /// The agent joined; the conversation is now tracked.
    Tracked,
    /// The agent left; the conversation is no longer tracked.
    Untracked,
    /// A member joined.
    MemberAdded,
    /// A member left.
    MemberRemoved,
}

/// Consumes membership events.
pub struct ConversationTracker {
    registry: Arc<MembershipRegistry>,
    store: Arc<dyn StateStore>,
    scheduler: Arc<AuditScheduler>,
    interval: Duration,
}

impl ConversationTracker {
    /// Create a tracker arming audits every `interval`.
    pub fn new(
        registry: Arc<MembershipRegistry>,
        store: Arc<dyn StateStore>,
        scheduler: Arc<AuditScheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            scheduler,
            interval,
        }
    }

    /// Apply one event.
    #[instrument(skip_all, fields(chat_id = event.conversation.id.get()))]
    pub async fn on_membership_event(&self, event: MembershipEvent) -> Result<TrackerOutcome> {
        let Some(transition) = extract_status_change(&event.change) else {
            return Ok(TrackerOutcome::Ignored);
        };

        let conversation = &event.conversation;
        match event.scope {
            MembershipScope::Own => {
                if !conversation.kind.is_auditable() {
                    return Ok(TrackerOutcome::Ignored);
                }
                if transition.is_join() {
                    self.track(conversation, &event.actor).await
                } else if transition.is_leave() {
                    self.untrack(conversation, &event.actor).await
                } else {
                    Ok(TrackerOutcome::Ignored)
                }
            }
            MembershipScope::Member { handle } => {
                let Some(handle) = handle else {
                    debug!("member without username, skipping");
                    return Ok(TrackerOutcome::Ignored);
                };
                if transition.is_join() {
                    self.member_joined(conversation, &event.actor, &handle).await
                } else if transition.is_leave() {
                    self.member_left(conversation, &event.actor, &handle).await
                } else {
                    Ok(TrackerOutcome::Ignored)
                }
            }
        }
    }

    async fn track(&self, conversation: &Conversation, actor: &str) -> Result<TrackerOutcome> {
        let id = conversation.id;
        let _ = self.store.track(id).await?;
        let _ = self.registry.track(id);
        let _ = self.scheduler.start(id, self.interval);
        info!(
            actor,
            title = conversation.display_title(),
            "agent added to {}",
            conversation.kind.noun()
        );
        Ok(TrackerOutcome::Tracked)
    }

    async fn untrack(&self, conversation: &Conversation, actor: &str) -> Result<TrackerOutcome> {
        let id = conversation.id;
        let _ = self.store.untrack(id).await?;
        let _ = self.registry.untrack(id);
        if !self.scheduler.stop(id) {
            warn!(title = conversation.display_title(), "no audit task to stop");
        }
        info!(
            actor,
            title = conversation.display_title(),
            "agent removed from {}",
            conversation.kind.noun()
        );
        Ok(TrackerOutcome::Untracked)
    }

    async fn member_joined(
        &self,
        conversation: &Conversation,
        actor: &str,
        handle: &str,
    ) -> Result<TrackerOutcome> {
        let _ = self.store.add_member(conversation.id, handle).await?;
        let _ = self.registry.add_member(conversation.id, handle);
        info!(actor, member = handle, title = conversation.display_title(), "member added");
        Ok(TrackerOutcome::MemberAdded)
    }

    async fn member_left(
        &self,
        conversation: &Conversation,
        actor: &str,
        handle: &str,
    ) -> Result<TrackerOutcome> {
        let _ = self.store.remove_member(conversation.id, handle).await?;
        if !self.registry.remove_member(conversation.id, handle) {
            debug!(member = handle, "leave without a recorded join");
        }
        info!(actor, member = handle, title = conversation.display_title(), "member removed");
        Ok(TrackerOutcome::MemberRemoved)
    }
}
