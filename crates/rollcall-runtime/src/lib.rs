//! # rollcall-runtime
//!
//! Behaviour of the rollcall agent, independent of the chat platform and
//! the storage engine:
//!
//! - **Registry**: in-memory tracked set and per-conversation rosters
//! - **Tracker**: applies membership events (own and member scope)
//! - **Scheduler**: one periodic audit task per tracked conversation
//! - **Audit**: roster minus allow-list, reported to administrators
//! - **Bootstrap**: restores state and re-arms audits at startup
//! - **Commands**: `/start`, `/me`, and the `/load` allow-list dialog
//!
//! The platform and storage are reached only through the ports in
//! [`traits`].

#![deny(unsafe_code)]

pub mod audit;
pub mod bootstrap;
pub mod commands;
pub mod errors;
pub mod notifier;
pub mod registry;
pub mod scheduler;
pub mod tracker;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use audit::{AuditEngine, AuditOutcome, denied_members};
pub use bootstrap::{BootstrapReconciler, BootstrapReport};
pub use commands::{CommandRouter, IncomingDocument, IncomingMessage};
pub use errors::{Result, RuntimeError, TransportError};
pub use notifier::{DeliverySummary, NotificationDispatcher, format_report};
pub use registry::MembershipRegistry;
pub use scheduler::AuditScheduler;
pub use tracker::{ConversationTracker, MembershipEvent, MembershipScope, TrackerOutcome};
pub use traits::{
    Administrator, AllowListStore, AuditRunner, ChatTransport, LoadReport, StateStore,
};
