//! # rollcall-store
//!
//! `SQLite` persistence for rollcall:
//!
//! - **Connection**: r2d2 pool with WAL and busy-timeout pragmas
//! - **Migrations**: `tracked_conversations` and `usernames` tables
//! - **Repositories**: stateless SQL over a `&Connection`
//! - **Store**: [`RollcallStore`], one transaction per logical operation

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
mod store;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use repositories::{AllowListRepo, LoadSummary, RosterRepo, TrackedRepo};
pub use store::RollcallStore;
