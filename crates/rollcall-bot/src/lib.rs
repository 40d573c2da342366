//! # rollcall-bot
//!
//! Binary support crate: adapts the `SQLite` store and the Bot API client to
//! the runtime ports, routes updates, and coordinates shutdown.

#![deny(unsafe_code)]

pub mod app;
pub mod dispatch;
pub mod providers;
pub mod shutdown;

pub use app::Rollcall;
pub use dispatch::UpdateDispatcher;
pub use shutdown::ShutdownCoordinator;
