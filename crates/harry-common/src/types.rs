//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw snowflake value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake_id!(
    /// A Discord guild (server) ID.
    GuildId
);

snowflake_id!(
    /// A Discord channel ID.
    ChannelId
);

snowflake_id!(
    /// A Discord user ID.
    UserId
);

snowflake_id!(
    /// A Discord message ID.
    MessageId
);

impl UserId {
    /// Formats the id as a Discord user mention.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    /// Formats the id as a Discord channel mention.
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_mention() {
        assert_eq!(UserId(42).to_string(), "42");
        assert_eq!(UserId(42).mention(), "<@42>");
        assert_eq!(ChannelId(7).mention(), "<#7>");
    }

    #[test]
    fn test_serde_is_transparent_number() {
        let json = serde_json::to_string(&GuildId(123)).unwrap();
        assert_eq!(json, "123");
        let parsed: GuildId = serde_json::from_str("123").unwrap();
        assert_eq!(parsed, GuildId(123));
    }
}
