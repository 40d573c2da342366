//! Per-conversation allow-list table naming.
//!
//! Each conversation's allow-list lives in its own table. The table name is
//! the decimal conversation ID with a leading minus sign replaced by an
//! underscore (`-100123` becomes `_100123`), which keeps names compatible
//! with existing deployments. [`AllowListTable`] is the only constructor of
//! such names, and it only ever yields `_?[0-9]+`, so a name can be spliced
//! into SQL (quoted) without an injection path.

use std::fmt;

use thiserror::Error;

use crate::ids::ConversationId;

/// A table name that is not a valid encoded conversation ID.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid allow-list table name: {0:?}")]
pub struct InvalidTableName(pub String);

/// Encoded allow-list table name for one conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AllowListTable(String);

impl AllowListTable {
    /// Derive the table name for a conversation.
    #[must_use]
    pub fn for_conversation(id: ConversationId) -> Self {
        let raw = id.get().to_string();
        match raw.strip_prefix('-') {
            Some(digits) => Self(format!("_{digits}")),
            None => Self(raw),
        }
    }

    /// Validate an already-encoded name (e.g. read back from the schema).
    pub fn parse(name: &str) -> Result<Self, InvalidTableName> {
        let digits = name.strip_prefix('_').unwrap_or(name);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTableName(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    /// Raw table name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name quoted as an SQL identifier.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for AllowListTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
