use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;

/// Member as reported by the hosted auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl AuthUser {
    /// "First Last", or whichever part is present
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// The hosted authentication widget.
///
/// Kept behind a trait so the session adapter can run against the real
/// provider, the bypass used for testing, or a scripted fake.
#[async_trait]
pub trait AuthWidget: Send + Sync {
    /// Initialize with the provider's public key
    async fn init(&self, public_key: &str) -> Result<()>;

    /// Member of the current session, if any
    async fn current_member(&self) -> Result<Option<AuthUser>>;

    /// Run the interactive sign-in flow. Returning does not guarantee the
    /// session is already visible through `current_member`.
    async fn open_login(&self) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    /// Session-changed notifications, when the provider offers them
    fn subscribe(&self) -> Option<broadcast::Receiver<Option<AuthUser>>> {
        None
    }

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: "t@test.com".to_string(),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(Some("Test"), Some("Teacher")).display_name().as_deref(), Some("Test Teacher"));
        assert_eq!(user(None, Some("Teacher")).display_name().as_deref(), Some("Teacher"));
        assert_eq!(user(Some(" "), None).display_name(), None);
    }
}
