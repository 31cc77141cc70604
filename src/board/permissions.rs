//! Who may do what on the board.
//!
//! Sessions are resolved by the caller; the board receives an [`Actor`] and
//! checks roles against it. The local operator (the CLI running against the
//! database directly) has administrator rights.

use crate::board::types::{Role, UserId};
use crate::board::user::UserProfile;
use crate::error::{BoardError, Result};

/// The party performing a board operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No signed-in user.
    Anonymous,
    /// A signed-in user with a profile.
    User(UserProfile),
    /// The local operator.
    Operator,
}

impl Actor {
    /// Returns true for the operator and for users with the admin role.
    pub fn is_admin(&self) -> bool {
        match self {
            Actor::Operator => true,
            Actor::User(profile) => profile.role == Role::Admin,
            Actor::Anonymous => false,
        }
    }

    /// The profile id content is attributed to, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::User(profile) => Some(profile.id),
            _ => None,
        }
    }

    /// Short label for log lines.
    pub fn label(&self) -> String {
        match self {
            Actor::Anonymous => "anonymous".to_string(),
            Actor::User(profile) => profile.username.clone(),
            Actor::Operator => "operator".to_string(),
        }
    }
}

/// Fails with `Unauthorized` unless the actor is an administrator.
pub fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(BoardError::unauthorized(format!(
            "{} is not an administrator",
            actor.label()
        )))
    }
}

/// Returns the author id for new content, or `Unauthorized` if the actor
/// has no profile to attribute it to.
pub fn require_member(actor: &Actor) -> Result<UserId> {
    actor
        .user_id()
        .ok_or_else(|| BoardError::unauthorized("You must be signed in to post"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_checks() {
        let admin = Actor::User(UserProfile::new("admin", Role::Admin).unwrap());
        let member = Actor::User(UserProfile::new("member", Role::User).unwrap());

        assert!(require_admin(&Actor::Operator).is_ok());
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(
            require_admin(&member).unwrap_err(),
            BoardError::Unauthorized(_)
        ));
        assert!(require_admin(&Actor::Anonymous).is_err());
    }

    #[test]
    fn test_member_checks() {
        let profile = UserProfile::new("member", Role::User).unwrap();
        let id = profile.id;
        assert_eq!(require_member(&Actor::User(profile)).unwrap(), id);
        assert!(require_member(&Actor::Anonymous).is_err());
        // The operator is not a profile and cannot author content
        assert!(require_member(&Actor::Operator).is_err());
    }
}
