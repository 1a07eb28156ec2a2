//! Session and credential models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Authenticated identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthUser {
    /// Provider-assigned user ID
    pub uid: String,
    /// Email address (may be None for some providers)
    pub email: Option<String>,
}

/// Email/password pair submitted to the provider.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "INVALID_EMAIL"))]
    pub email: String,
    #[validate(length(
        min = 6,
        message = "WEAK_PASSWORD : Password should be at least 6 characters"
    ))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    /// First validation message, in the provider's error vocabulary.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| {
            errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "INVALID_ARGUMENT".to_string())
        })
    }
}

/// Current session as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not reported its initial state yet
    Loading,
    SignedOut,
    SignedIn(AuthUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

impl From<Option<AuthUser>> for SessionState {
    fn from(user: Option<AuthUser>) -> Self {
        match user {
            Some(user) => SessionState::SignedIn(user),
            None => SessionState::SignedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new(" alice@example.com ", "hunter22").check().is_ok());
        assert_eq!(
            Credentials::new("not-an-email", "hunter22").check(),
            Err("INVALID_EMAIL".to_string())
        );
        assert!(Credentials::new("alice@example.com", "123")
            .check()
            .unwrap_err()
            .starts_with("WEAK_PASSWORD"));
    }

    #[test]
    fn test_session_state_from_user() {
        let user = AuthUser {
            uid: "uid-1".to_string(),
            email: None,
        };
        assert_eq!(SessionState::from(None), SessionState::SignedOut);
        assert_eq!(
            SessionState::from(Some(user.clone())).user(),
            Some(&user)
        );
        assert!(SessionState::Loading.is_loading());
    }
}
