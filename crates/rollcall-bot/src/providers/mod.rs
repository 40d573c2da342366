//! Concrete implementations of the runtime ports.
//!
//! They live in the binary crate so `rollcall-runtime` depends on neither
//! `rollcall-store` nor `rollcall-telegram`; it only defines the traits.

pub mod sqlite_store;
pub mod telegram_transport;

pub use sqlite_store::{SqliteAllowLists, SqliteStateStore};
pub use telegram_transport::TelegramTransport;
