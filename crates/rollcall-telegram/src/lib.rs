//! # rollcall-telegram
//!
//! Thin Telegram Bot API layer:
//!
//! - [`BotApi`]: JSON-over-HTTP client for the handful of methods rollcall uses
//! - [`types`]: serde wire types (`Update`, `ChatMemberUpdated`, `ChatMember`, ...)
//! - [`UpdatePoller`]: `getUpdates` long-poll loop with offset tracking,
//!   jittered exponential backoff and cancellation

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod poller;
pub mod types;

pub use client::BotApi;
pub use errors::{Result, TelegramError};
pub use poller::{BackoffConfig, UpdatePoller};
pub use types::{ALLOWED_UPDATES, Chat, ChatMember, ChatMemberUpdated, Message, Update, User};
