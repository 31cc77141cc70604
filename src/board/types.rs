//! Shared types for the board: record identifiers, roles and timestamps.

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Returns the current time in milliseconds since the Unix epoch.
pub fn current_timestamp_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the 16 raw bytes, used as storage keys.
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Rebuilds an identifier from a 16-byte storage key.
            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                Uuid::from_slice(bytes).map(Self).map_err(|e| {
                    BoardError::serialization(format!("Invalid {} key: {}", $label, e))
                })
            }

            /// Parses the textual form of an identifier.
            pub fn parse(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| BoardError::validation(format!("Invalid {} id: {}", $label, s)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = BoardError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

record_id!(
    /// Identifier of a category.
    CategoryId,
    "category"
);
record_id!(
    /// Identifier of a forum. Its textual form is the raw URL fallback when a
    /// forum has no short code.
    ForumId,
    "forum"
);
record_id!(
    /// Identifier of a thread.
    ThreadId,
    "thread"
);
record_id!(
    /// Identifier of a post.
    PostId,
    "post"
);
record_id!(
    /// Identifier of a user profile.
    UserId,
    "user"
);

/// Role attached to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    /// Regular member: can start threads and reply.
    #[default]
    User,
    /// Administrator: manages categories, forums and moderation flags.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(BoardError::validation(format!("Unknown role: {}", other))),
        }
    }
}
