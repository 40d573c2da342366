//! Member status and the membership transition rule.
//!
//! A chat-member update carries the member's status before and after the
//! change. [`extract_status_change`] reduces that snapshot to a
//! `(was_member, is_member)` pair. `restricted` is a member-like state whose
//! membership is carried by the separate `is_member` flag, so it does not map
//! onto the member/non-member split by status alone.

use serde::{Deserialize, Serialize};

/// Membership status as reported by the Bot API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Conversation owner.
    #[serde(alias = "owner")]
    Creator,
    /// Administrator.
    Administrator,
    /// Ordinary member.
    Member,
    /// Restricted; membership is given by the `is_member` flag.
    Restricted,
    /// Left the conversation.
    Left,
    /// Banned from the conversation.
    #[serde(alias = "banned")]
    Kicked,
}

impl MemberStatus {
    /// Whether this status counts as membership, given the accompanying
    /// `is_member` flag (only consulted for [`MemberStatus::Restricted`]).
    #[must_use]
    pub const fn counts_as_member(self, is_member: Option<bool>) -> bool {
        match self {
            Self::Creator | Self::Administrator | Self::Member => true,
            Self::Restricted => matches!(is_member, Some(true)),
            Self::Left | Self::Kicked => false,
        }
    }
}

/// One side of a status snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// Status, `None` when the transport omitted it.
    pub status: Option<MemberStatus>,
    /// Membership flag for restricted members.
    pub is_member: Option<bool>,
}

impl MemberSnapshot {
    /// Snapshot with a status and no `is_member` flag.
    #[must_use]
    pub const fn of(status: MemberStatus) -> Self {
        Self {
            status: Some(status),
            is_member: None,
        }
    }

    /// Snapshot of a restricted member.
    #[must_use]
    pub const fn restricted(is_member: bool) -> Self {
        Self {
            status: Some(MemberStatus::Restricted),
            is_member: Some(is_member),
        }
    }
}

/// Before/after snapshot delivered with a membership-change event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// State before the change.
    pub old: MemberSnapshot,
    /// State after the change.
    pub new: MemberSnapshot,
}

impl StatusChange {
    /// Build a change from two snapshots.
    #[must_use]
    pub const fn new(old: MemberSnapshot, new: MemberSnapshot) -> Self {
        Self { old, new }
    }
}

/// Reduced membership transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Membership before the change.
    pub was_member: bool,
    /// Membership after the change.
    pub is_member: bool,
}

impl Transition {
    /// Non-member became member.
    #[must_use]
    pub const fn is_join(self) -> bool {
        !self.was_member && self.is_member
    }

    /// Member became non-member.
    #[must_use]
    pub const fn is_leave(self) -> bool {
        self.was_member && !self.is_member
    }
}

/// Reduce a status snapshot to a membership transition.
///
/// Returns `None` when either side lacks a status, or when neither the
/// status nor the `is_member` flag changed. A `Some` result may still be
/// membership-neutral (e.g. member promoted to administrator); callers act
/// only on [`Transition::is_join`] and [`Transition::is_leave`].
#[must_use]
pub fn extract_status_change(change: &StatusChange) -> Option<Transition> {
    let old_status = change.old.status?;
    let new_status = change.new.status?;

    if old_status == new_status && change.old.is_member == change.new.is_member {
        return None;
    }

    Some(Transition {
        was_member: old_status.counts_as_member(change.old.is_member),
        is_member: new_status.counts_as_member(change.new.is_member),
    })
}
