//! Configuration faults.

use thiserror::Error;

/// Settings could not be loaded, or are unusable once loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not JSON, or a value has the wrong type.
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
    /// A required value is not set anywhere.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// A value is present but out of range.
    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

/// Settings result alias.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn json_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = SettingsError::Json(json_err);
        assert!(err.to_string().contains("malformed settings file"));
    }

    #[test]
    fn missing_display() {
        let err = SettingsError::Missing("telegram.botToken");
        assert_eq!(err.to_string(), "missing required setting: telegram.botToken");
    }

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("audit interval must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid setting: audit interval must be positive"
        );
    }
}
