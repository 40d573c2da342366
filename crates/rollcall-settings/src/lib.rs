//! # rollcall-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`RollcallSettings::default()`]
//! 2. **Settings file**: `~/.rollcall/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `BOT_TOKEN`, `DELTA_CHECK` and `ROLLCALL_*`
//!    overrides (highest priority)
//!
//! Loading never fails on missing values; [`RollcallSettings::validate`]
//! turns the result into [`ValidatedSettings`] or a configuration fault that
//! must stop the process before it accepts any events.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
