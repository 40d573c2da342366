//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a settings file may specify any subset of fields.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "telegram": { "botToken": "123:abc" },
///   "audit": { "intervalSecs": 3600 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollcallSettings {
    /// Bot API access.
    pub telegram: TelegramSettings,
    /// Audit scheduling.
    pub audit: AuditSettings,
    /// Durable store.
    pub database: DatabaseSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

/// Bot API access settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramSettings {
    /// Bot token issued by `@BotFather`. Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// Bot API base URL.
    pub api_base_url: String,
    /// Long-poll timeout for `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

/// Audit scheduling settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditSettings {
    /// Seconds between audit ticks, applied to every tracked conversation.
    /// Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

/// Durable store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Path of the `SQLite` database file.
    pub path: PathBuf,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: rollcall_home().join("rollcall.db"),
            pool_size: 8,
            busy_timeout_ms: 5000,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (overridden by `RUST_LOG`).
    pub level: String,
    /// Persist warn+ records into the `logs` table.
    pub persist_warnings: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            persist_warnings: true,
        }
    }
}

/// Upper bound for `audit.intervalSecs`, from any source.
pub const MAX_AUDIT_INTERVAL_SECS: u64 = 4_294_967_295;

/// Settings with every required value present and checked.
#[derive(Clone, Debug)]
pub struct ValidatedSettings {
    /// Bot token.
    pub bot_token: String,
    /// Bot API base URL, without trailing slash.
    pub api_base_url: String,
    /// Long-poll timeout.
    pub poll_timeout: Duration,
    /// Audit interval.
    pub audit_interval: Duration,
    /// Durable store settings.
    pub database: DatabaseSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl RollcallSettings {
    /// Check required values. Any error here is a configuration fault.
    pub fn validate(&self) -> Result<ValidatedSettings> {
        let bot_token = self
            .telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SettingsError::Missing("telegram.botToken"))?
            .to_string();

        let interval = self
            .audit
            .interval_secs
            .ok_or(SettingsError::Missing("audit.intervalSecs"))?;
        if !(1..=MAX_AUDIT_INTERVAL_SECS).contains(&interval) {
            return Err(SettingsError::InvalidValue(format!(
                "audit.intervalSecs must be between 1 and {MAX_AUDIT_INTERVAL_SECS}"
            )));
        }

        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "database.poolSize must be greater than zero".to_string(),
            ));
        }

        Ok(ValidatedSettings {
            bot_token,
            api_base_url: self.telegram.api_base_url.trim_end_matches('/').to_string(),
            poll_timeout: Duration::from_secs(self.telegram.poll_timeout_secs),
            audit_interval: Duration::from_secs(interval),
            database: self.database.clone(),
            logging: self.logging.clone(),
        })
    }
}

/// Base directory for rollcall state (`~/.rollcall`).
pub fn rollcall_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".rollcall")
}
