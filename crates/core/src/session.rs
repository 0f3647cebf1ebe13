//! The signed-in user.

use crate::types::{AuthToken, UserProfile};

/// Current session.
///
/// Profile and token are only ever present together, so a token without a
/// user (or the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        user: UserProfile,
        token: AuthToken,
    },
}

impl Session {
    /// Build an authenticated session, rejecting a blank token.
    #[must_use]
    pub fn authenticated(user: UserProfile, token: AuthToken) -> Self {
        if token.is_blank() {
            Self::Anonymous
        } else {
            Self::Authenticated { user, token }
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    fn user() -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            name: "Juan".to_string(),
            email: "juan@relux.ph".to_string(),
        }
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        assert_eq!(Session::authenticated(user(), AuthToken::new("  ")), Session::Anonymous);
    }

    #[test]
    fn test_authenticated_exposes_both() {
        let session = Session::authenticated(user(), AuthToken::new("t"));
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|u| u.id), Some(UserId::new(1)));
        assert_eq!(session.token().map(AuthToken::expose), Some("t"));
    }
}
