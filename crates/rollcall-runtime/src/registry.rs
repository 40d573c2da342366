//! In-memory tracked set and rosters.
//!
//! Both maps sit behind one lock so a reader never sees a conversation
//! registered without its roster (or the reverse) mid-update.

use std::collections::{BTreeSet, HashMap, HashSet};

use parking_lot::RwLock;
use rollcall_core::ConversationId;

#[derive(Debug, Default)]
struct Inner {
    tracked: HashSet<ConversationId>,
    rosters: HashMap<ConversationId, BTreeSet<String>>,
}

/// Tracked conversations and their observed rosters.
///
/// A roster exists only once a member of that conversation has been seen
/// joining, or after bootstrap restored it; [`roster`](Self::roster) returns
/// `None` otherwise.
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    inner: RwLock<Inner>,
}

impl MembershipRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tracked conversation. Returns `false` if already present.
    pub fn track(&self, id: ConversationId) -> bool {
        self.inner.write().tracked.insert(id)
    }

    /// Unregister a tracked conversation. Returns whether it was present.
    /// The roster is kept.
    pub fn untrack(&self, id: ConversationId) -> bool {
        self.inner.write().tracked.remove(&id)
    }

    /// Whether `id` is tracked.
    #[must_use]
    pub fn is_tracked(&self, id: ConversationId) -> bool {
        self.inner.read().tracked.contains(&id)
    }

    /// Tracked conversations, sorted.
    #[must_use]
    pub fn tracked(&self) -> Vec<ConversationId> {
        let mut ids: Vec<_> = self.inner.read().tracked.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Add a member, creating the roster if needed. Returns `false` if the
    /// handle was already present.
    pub fn add_member(&self, id: ConversationId, handle: &str) -> bool {
        self.inner
            .write()
            .rosters
            .entry(id)
            .or_default()
            .insert(handle.to_owned())
    }

    /// Remove a member. Returns whether the handle was present.
    pub fn remove_member(&self, id: ConversationId, handle: &str) -> bool {
        self.inner
            .write()
            .rosters
            .get_mut(&id)
            .is_some_and(|roster| roster.remove(handle))
    }

    /// Snapshot of a conversation's roster.
    #[must_use]
    pub fn roster(&self, id: ConversationId) -> Option<BTreeSet<String>> {
        self.inner.read().rosters.get(&id).cloned()
    }

    /// Register `id` as tracked with exactly `members` as its roster.
    pub fn restore<I>(&self, id: ConversationId, members: I)
    where
        I: IntoIterator<Item = String>,
    {
        let roster: BTreeSet<String> = members.into_iter().collect();
        let mut inner = self.inner.write();
        let _ = inner.tracked.insert(id);
        let _ = inner.rosters.insert(id, roster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ConversationId = ConversationId::new(-100_555);

    #[test]
    fn track_and_untrack_report_changes() {
        let registry = MembershipRegistry::new();
        assert!(registry.track(CHAT));
        assert!(!registry.track(CHAT));
        assert!(registry.is_tracked(CHAT));
        assert!(registry.untrack(CHAT));
        assert!(!registry.untrack(CHAT));
        assert!(registry.tracked().is_empty());
    }

    #[test]
    fn roster_absent_until_first_member() {
        let registry = MembershipRegistry::new();
        let _ = registry.track(CHAT);
        assert_eq!(registry.roster(CHAT), None);
        assert!(registry.add_member(CHAT, "alice"));
        assert!(!registry.add_member(CHAT, "alice"));
        assert_eq!(registry.roster(CHAT).unwrap().len(), 1);
    }

    #[test]
    fn remove_missing_member_is_noop() {
        let registry = MembershipRegistry::new();
        assert!(!registry.remove_member(CHAT, "ghost"));
        let _ = registry.add_member(CHAT, "alice");
        assert!(!registry.remove_member(CHAT, "ghost"));
        assert!(registry.remove_member(CHAT, "alice"));
        assert_eq!(registry.roster(CHAT), Some(BTreeSet::new()));
    }

    #[test]
    fn untrack_keeps_roster() {
        let registry = MembershipRegistry::new();
        registry.restore(CHAT, ["x".to_string()]);
        let _ = registry.untrack(CHAT);
        assert!(registry.roster(CHAT).unwrap().contains("x"));
    }

    #[test]
    fn restore_replaces_roster_and_tracks() {
        let registry = MembershipRegistry::new();
        let _ = registry.add_member(CHAT, "stale");
        registry.restore(CHAT, ["x".to_string(), "y".to_string(), "x".to_string()]);
        assert!(registry.is_tracked(CHAT));
        let roster = registry.roster(CHAT).unwrap();
        assert_eq!(roster.into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn tracked_is_sorted() {
        let registry = MembershipRegistry::new();
        for raw in [5, -3, 0] {
            let _ = registry.track(ConversationId::new(raw));
        }
        let ids: Vec<i64> = registry.tracked().into_iter().map(ConversationId::get).collect();
        assert_eq!(ids, vec![-3, 0, 5]);
    }
}
