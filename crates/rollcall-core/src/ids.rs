//! Numeric ID newtypes for type safety.
//!
//! Telegram identifies chats and users with signed 64-bit integers. Groups,
//! supergroups and channels use negative identifiers. Wrapping them keeps a
//! user ID from being passed where a conversation ID is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identifier of a chat, group, supergroup or channel.
    ConversationId
);

numeric_id!(
    /// Identifier of a Telegram user (human or bot).
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_decimal_form() {
        assert_eq!(ConversationId::new(-100_555).to_string(), "-100555");
        assert_eq!(UserId::new(42).to_string(), "42");
    }

    #[test]
    fn parse_round_trips_stored_text() {
        let id: ConversationId = "-1001234567890".parse().unwrap();
        assert_eq!(id.get(), -1_001_234_567_890);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let id: ConversationId = " 17 ".parse().unwrap();
        assert_eq!(id, ConversationId::new(17));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("chat-1".parse::<ConversationId>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId::new(7));
    }
}
