//! # rollcall-core
//!
//! Shared vocabulary for the rollcall workspace:
//!
//! - **Identities**: [`ConversationId`] and [`UserId`] as numeric newtypes
//! - **Conversations**: [`Conversation`] with its [`ConversationKind`]
//! - **Membership**: [`MemberStatus`], [`StatusChange`] and the pure
//!   [`extract_status_change`] transition rule
//! - **Allow-list naming**: [`AllowListTable`], the only place a per-conversation
//!   table name is ever derived

#![deny(unsafe_code)]

pub mod allow_list;
pub mod conversation;
pub mod ids;
pub mod status;

pub use allow_list::{AllowListTable, InvalidTableName};
pub use conversation::{Conversation, ConversationKind};
pub use ids::{ConversationId, UserId};
pub use status::{MemberSnapshot, MemberStatus, StatusChange, Transition, extract_status_change};
