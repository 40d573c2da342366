//! In-memory port implementations for unit tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rollcall_core::{Conversation, ConversationId, ConversationKind, UserId};

use crate::errors::{Result, RuntimeError, TransportError};
use crate::traits::{Administrator, AllowListStore, ChatTransport, LoadReport, StateStore};

pub(crate) fn admin(id: i64, username: &str) -> Administrator {
    Administrator {
        user_id: UserId::new(id),
        username: Some(username.to_string()),
        first_name: username.to_uppercase(),
        is_bot: false,
    }
}

pub(crate) fn bot_admin(id: i64) -> Administrator {
    Administrator {
        user_id: UserId::new(id),
        username: Some(format!("bot{id}")),
        first_name: "Bot".to_string(),
        is_bot: true,
    }
}

pub(crate) fn supergroup(id: i64, title: &str, username: Option<&str>) -> Conversation {
    Conversation {
        id: ConversationId::new(id),
        kind: ConversationKind::Supergroup,
        title: Some(title.to_string()),
        username: username.map(String::from),
    }
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    admins: Mutex<HashMap<ConversationId, Vec<Administrator>>>,
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<UserId>>,
    sent: Mutex<Vec<(UserId, String)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_admins(&self, id: ConversationId, admins: Vec<Administrator>) {
        let _ = self.admins.lock().insert(id, admins);
    }

    pub(crate) fn set_conversation(&self, conversation: Conversation) {
        let _ = self.conversations.lock().insert(conversation.id, conversation);
    }

    pub(crate) fn add_document(&self, file_id: &str, content: &[u8]) {
        let _ = self
            .documents
            .lock()
            .insert(file_id.to_string(), content.to_vec());
    }

    pub(crate) fn fail_delivery_to(&self, user: UserId) {
        let _ = self.failing.lock().insert(user);
    }

    pub(crate) fn sent(&self) -> Vec<(UserId, String)> {
        self.sent.lock().clone()
    }

    pub(crate) fn sent_to(&self, user: UserId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub(crate) fn last_sent_to(&self, user: UserId) -> Option<String> {
        self.sent_to(user).pop()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_direct_message(
        &self,
        user: UserId,
        text: &str,
    ) -> std::result::Result<(), TransportError> {
        if self.failing.lock().contains(&user) {
            return Err(TransportError::Rejected {
                code: 403,
                description: "Forbidden: bot was blocked by the user".into(),
            });
        }
        self.sent.lock().push((user, text.to_string()));
        Ok(())
    }

    async fn list_administrators(
        &self,
        conversation: ConversationId,
    ) -> std::result::Result<Vec<Administrator>, TransportError> {
        self.admins
            .lock()
            .get(&conversation)
            .cloned()
            .ok_or_else(|| TransportError::Rejected {
                code: 400,
                description: "Bad Request: chat not found".into(),
            })
    }

    async fn get_conversation(
        &self,
        conversation: ConversationId,
    ) -> std::result::Result<Conversation, TransportError> {
        self.conversations
            .lock()
            .get(&conversation)
            .cloned()
            .ok_or_else(|| TransportError::Rejected {
                code: 400,
                description: "Bad Request: chat not found".into(),
            })
    }

    async fn download_document(
        &self,
        file_id: &str,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        self.documents
            .lock()
            .get(file_id)
            .cloned()
            .ok_or_else(|| TransportError::Unavailable(format!("no such file {file_id}")))
    }
}

#[derive(Default)]
pub(crate) struct FakeAllowLists {
    lists: Mutex<HashMap<ConversationId, BTreeSet<String>>>,
    fail: AtomicBool,
    drop_on_check: AtomicBool,
}

impl FakeAllowLists {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: ConversationId, names: &[&str]) {
        self.lists
            .lock()
            .entry(id)
            .or_default()
            .extend(names.iter().map(|s| (*s).to_string()));
    }

    pub(crate) fn entries(&self, id: ConversationId) -> Option<BTreeSet<String>> {
        self.lists.lock().get(&id).cloned()
    }

    /// Make `has_list` delete the list right after answering.
    pub(crate) fn drop_after_existence_check(&self, enabled: bool) {
        self.drop_on_check.store(enabled, Ordering::SeqCst);
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RuntimeError::Store("database is locked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AllowListStore for FakeAllowLists {
    async fn has_list(&self, id: ConversationId) -> Result<bool> {
        self.check()?;
        let mut lists = self.lists.lock();
        let exists = lists.contains_key(&id);
        if self.drop_on_check.load(Ordering::SeqCst) {
            let _ = lists.remove(&id);
        }
        Ok(exists)
    }

    async fn allowed_among(
        &self,
        id: ConversationId,
        candidates: &[String],
    ) -> Result<Option<BTreeSet<String>>> {
        self.check()?;
        Ok(self.lists.lock().get(&id).map(|list| {
            candidates
                .iter()
                .filter(|c| list.contains(*c))
                .cloned()
                .collect()
        }))
    }

    async fn load(&self, id: ConversationId, names: Vec<String>) -> Result<LoadReport> {
        self.check()?;
        let mut lists = self.lists.lock();
        let list = lists.entry(id).or_default();
        let mut report = LoadReport::default();
        for name in names {
            let name = name.trim();
            if !name.is_empty() && list.insert(name.to_string()) {
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }
}

#[derive(Default)]
pub(crate) struct FakeStateStore {
    tracked: Mutex<BTreeSet<ConversationId>>,
    rosters: Mutex<HashMap<ConversationId, BTreeSet<String>>>,
    fail_writes: AtomicBool,
}

impl FakeStateStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn seed(&self, id: ConversationId, members: &[&str]) {
        let _ = self.tracked.lock().insert(id);
        self.rosters
            .lock()
            .entry(id)
            .or_default()
            .extend(members.iter().map(|s| (*s).to_string()));
    }

    pub(crate) fn is_tracked(&self, id: ConversationId) -> bool {
        self.tracked.lock().contains(&id)
    }

    pub(crate) fn members(&self, id: ConversationId) -> BTreeSet<String> {
        self.rosters.lock().get(&id).cloned().unwrap_or_default()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RuntimeError::Store("disk I/O error".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for FakeStateStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn track(&self, id: ConversationId) -> Result<bool> {
        self.check_write()?;
        Ok(self.tracked.lock().insert(id))
    }

    async fn untrack(&self, id: ConversationId) -> Result<bool> {
        self.check_write()?;
        Ok(self.tracked.lock().remove(&id))
    }

    async fn list_tracked(&self) -> Result<Vec<ConversationId>> {
        Ok(self.tracked.lock().iter().copied().collect())
    }

    async fn add_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        self.check_write()?;
        Ok(self
            .rosters
            .lock()
            .entry(id)
            .or_default()
            .insert(handle.to_string()))
    }

    async fn remove_member(&self, id: ConversationId, handle: &str) -> Result<bool> {
        self.check_write()?;
        Ok(self
            .rosters
            .lock()
            .get_mut(&id)
            .is_some_and(|r| r.remove(handle)))
    }

    async fn roster_of(&self, id: ConversationId) -> Result<Vec<String>> {
        Ok(self.members(id).into_iter().collect())
    }
}
