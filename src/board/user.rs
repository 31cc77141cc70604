//! User profiles. Sign-in happens elsewhere; the board only needs the
//! profile row to attribute content and check roles.

use crate::board::types::{current_timestamp_millis, Role, UserId};
use crate::board::validation;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A user profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Unique, case-sensitive username.
    pub username: String,
    pub role: Role,
    pub created_at: u64,
}

impl UserProfile {
    /// Creates a new profile with a fresh identifier.
    pub fn new(username: &str, role: Role) -> Result<Self> {
        Ok(Self {
            id: UserId::new(),
            username: validation::username(username)?,
            role,
            created_at: current_timestamp_millis(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
