//! Layered settings: compiled defaults, then the JSON settings file, then
//! environment variables.
//!
//! The file may hold any subset of keys; it is merged over the defaults
//! before deserialization, so omitted keys keep their default values.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{MAX_AUDIT_INTERVAL_SECS, RollcallSettings, rollcall_home};

/// Bot token, named as in existing deployments.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
/// Audit interval in seconds, named as in existing deployments.
pub const ENV_AUDIT_INTERVAL: &str = "DELTA_CHECK";
/// Database file path.
pub const ENV_DB_PATH: &str = "ROLLCALL_DB_PATH";
/// Default log filter.
pub const ENV_LOG_LEVEL: &str = "ROLLCALL_LOG_LEVEL";
/// Bot API base URL.
pub const ENV_API_BASE_URL: &str = "ROLLCALL_API_BASE_URL";

/// Resolve the default settings file path (`~/.rollcall/settings.json`).
pub fn settings_path() -> PathBuf {
    rollcall_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RollcallSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults (plus overrides). If the
/// file contains invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<RollcallSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults merged with the settings file, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<RollcallSettings> {
    let defaults = serde_json::to_value(RollcallSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Overlay `source` on `target`.
///
/// Objects merge key by key, `null` in `source` leaves the target value in
/// place, and anything else in `source` replaces the target outright.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay.into_iter().filter(|(_, v)| !v.is_null()) {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut RollcallSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Invalid values are ignored with a warning, falling back to file/default.
pub fn apply_overrides<F>(settings: &mut RollcallSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = read_string(ENV_BOT_TOKEN) {
        settings.telegram.bot_token = Some(v);
    }
    if let Some(raw) = read_string(ENV_AUDIT_INTERVAL) {
        match parse_u64_range(&raw, 1, MAX_AUDIT_INTERVAL_SECS) {
            Some(v) => settings.audit.interval_secs = Some(v),
            None => {
                tracing::warn!(key = ENV_AUDIT_INTERVAL, value = %raw, "invalid interval env var, ignoring");
            }
        }
    }
    if let Some(v) = read_string(ENV_DB_PATH) {
        settings.database.path = PathBuf::from(v);
    }
    if let Some(v) = read_string(ENV_LOG_LEVEL) {
        settings.logging.level = v;
    }
    if let Some(v) = read_string(ENV_API_BASE_URL) {
        settings.telegram.api_base_url = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
