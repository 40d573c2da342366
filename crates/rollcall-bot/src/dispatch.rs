//! Routes Bot API updates to the tracker and the command router.
//!
//! Membership updates are applied inline, in delivery order, so the store
//! and registry see the same sequence the transport produced. Messages are
//! handled on background tasks since commands wait on several API calls.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rollcall_core::ConversationKind;
use rollcall_runtime::{
    CommandRouter, ConversationTracker, IncomingDocument, IncomingMessage, MembershipEvent,
    MembershipScope,
};
use rollcall_telegram::{ChatMemberUpdated, Message, Update, User};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

fn actor_name(user: &User) -> String {
    user.username
        .clone()
        .unwrap_or_else(|| user.first_name.clone())
}

/// Convert a `my_chat_member` (`own = true`) or `chat_member` payload.
pub fn membership_event(update: &ChatMemberUpdated, own: bool) -> MembershipEvent {
    let scope = if own {
        MembershipScope::Own
    } else {
        MembershipScope::Member {
            handle: update.new_chat_member.user.username.clone(),
        }
    };
    MembershipEvent {
        conversation: update.chat.to_conversation(),
        actor: actor_name(&update.from),
        scope,
        change: update.status_change(),
    }
}

/// Convert a message with a sender; anonymous messages yield `None`.
pub fn incoming_message(message: &Message) -> Option<IncomingMessage> {
    let from = message.from.as_ref()?;
    Some(IncomingMessage {
        from: from.id,
        private: message.chat.kind == ConversationKind::Private,
        text: message.text.clone(),
        document: message.document.as_ref().map(|d| IncomingDocument {
            file_id: d.file_id.clone(),
            file_name: d.file_name.clone(),
            mime_type: d.mime_type.clone(),
        }),
    })
}

/// Update fan-out.
pub struct UpdateDispatcher {
    tracker: Arc<ConversationTracker>,
    commands: Arc<CommandRouter>,
    tasks: Mutex<JoinSet<()>>,
}

impl UpdateDispatcher {
    /// Create a dispatcher.
    pub fn new(tracker: Arc<ConversationTracker>, commands: Arc<CommandRouter>) -> Self {
        Self {
            tracker,
            commands,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Handle one update.
    pub async fn dispatch(&self, update: Update) {
        if let Some(payload) = update.my_chat_member {
            self.apply(membership_event(&payload, true)).await;
        }
        if let Some(payload) = update.chat_member {
            self.apply(membership_event(&payload, false)).await;
        }
        if let Some(message) = update.message {
            match incoming_message(&message) {
                Some(msg) => self.spawn_command(msg),
                None => debug!(update_id = update.update_id, "message without sender"),
            }
        }
    }

    async fn apply(&self, event: MembershipEvent) {
        let chat_id = event.conversation.id.get();
        match self.tracker.on_membership_event(event).await {
            Ok(outcome) => debug!(chat_id, ?outcome, "membership event applied"),
            Err(e) => warn!(chat_id, error = %e, "membership event dropped"),
        }
    }

    fn spawn_command(&self, msg: IncomingMessage) {
        let router = Arc::clone(&self.commands);
        let mut tasks = self.tasks.lock();
        while let Some(result) = tasks.try_join_next() {
            log_join(result);
        }
        let _ = tasks.spawn(async move {
            let user_id = msg.from.get();
            if let Err(e) = router.handle(msg).await {
                warn!(user_id, error = %e, "command failed");
            }
        });
    }

    /// Wait up to `timeout` for in-flight commands, aborting the rest.
    pub async fn drain(&self, timeout: Duration) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        let pending = tasks.len();
        let drained = tokio::time::timeout(timeout, async {
            while let Some(result) = tasks.join_next().await {
                log_join(result);
            }
        })
        .await;
        if drained.is_err() {
            warn!(pending, "command drain timed out, aborting");
            tasks.abort_all();
        }
    }
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            warn!(error = %e, "command task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{ConversationId, MemberStatus, UserId, extract_status_change};
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn member_update(own: bool) -> Update {
        let payload = json!({
            "chat": {"id": -100_555, "type": "supergroup", "title": "Ops"},
            "from": {"id": 1, "is_bot": false, "first_name": "Alice", "username": "alice"},
            "old_chat_member": {"status": "left", "user": {"id": 5, "is_bot": false, "first_name": "Yan", "username": "y"}},
            "new_chat_member": {"status": "member", "user": {"id": 5, "is_bot": false, "first_name": "Yan", "username": "y"}}
        });
        let mut value = json!({"update_id": 7});
        let key = if own { "my_chat_member" } else { "chat_member" };
        value[key] = payload;
        update(value)
    }

    #[test]
    fn member_payload_carries_handle_and_transition() {
        let payload = member_update(false).chat_member.unwrap();
        let event = membership_event(&payload, false);
        assert_eq!(event.conversation.id, ConversationId::new(-100_555));
        assert_eq!(event.actor, "alice");
        assert_eq!(
            event.scope,
            MembershipScope::Member {
                handle: Some("y".into())
            }
        );
        assert_eq!(event.change.new.status, Some(MemberStatus::Member));
        assert!(extract_status_change(&event.change).unwrap().is_join());
    }

    #[test]
    fn own_payload_is_own_scope() {
        let payload = member_update(true).my_chat_member.unwrap();
        assert_eq!(membership_event(&payload, true).scope, MembershipScope::Own);
    }

    #[test]
    fn actor_falls_back_to_first_name() {
        let user = User {
            id: UserId::new(3),
            is_bot: false,
            first_name: "Carol".into(),
            username: None,
        };
        assert_eq!(actor_name(&user), "Carol");
    }

    #[test]
    fn private_document_message_converts() {
        let msg = update(json!({
            "update_id": 8,
            "message": {
                "message_id": 1,
                "from": {"id": 1, "is_bot": false, "first_name": "Alice"},
                "chat": {"id": 1, "type": "private"},
                "document": {"file_id": "F1", "file_name": "list.txt", "mime_type": "text/plain"}
            }
        }))
        .message
        .unwrap();
        let incoming = incoming_message(&msg).unwrap();
        assert!(incoming.private);
        assert_eq!(incoming.from, UserId::new(1));
        assert!(incoming.text.is_none());
        assert_eq!(incoming.document.unwrap().file_name.as_deref(), Some("list.txt"));
    }

    #[test]
    fn group_message_is_not_private() {
        let msg = update(json!({
            "update_id": 9,
            "message": {
                "message_id": 2,
                "from": {"id": 1, "is_bot": false, "first_name": "Alice"},
                "chat": {"id": -100_555, "type": "supergroup", "title": "Ops"},
                "text": "/me"
            }
        }))
        .message
        .unwrap();
        assert!(!incoming_message(&msg).unwrap().private);
    }

    #[test]
    fn anonymous_message_is_dropped() {
        let msg = update(json!({
            "update_id": 10,
            "message": {
                "message_id": 3,
                "chat": {"id": -100_555, "type": "channel", "title": "News"},
                "text": "hello"
            }
        }))
        .message
        .unwrap();
        assert!(incoming_message(&msg).is_none());
    }
}
