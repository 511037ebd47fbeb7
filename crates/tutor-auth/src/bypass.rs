use async_trait::async_trait;

use crate::error::Result;
use crate::widget::{AuthUser, AuthWidget};

/// Widget that always reports a fixed member. For local testing without the
/// hosted provider.
pub struct BypassWidget {
    user: AuthUser,
}

impl BypassWidget {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }
}

impl Default for BypassWidget {
    fn default() -> Self {
        Self::new(AuthUser {
            id: "test-user-123".to_string(),
            email: "teacher@test.com".to_string(),
            first_name: Some("Test".to_string()),
            last_name: Some("Teacher".to_string()),
        })
    }
}

#[async_trait]
impl AuthWidget for BypassWidget {
    async fn init(&self, _public_key: &str) -> Result<()> {
        tracing::warn!("Authentication bypassed, using fixed member {}", self.user.id);
        Ok(())
    }

    async fn current_member(&self) -> Result<Option<AuthUser>> {
        Ok(Some(self.user.clone()))
    }

    async fn open_login(&self) -> Result<()> {
        tracing::debug!("Login bypassed");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        tracing::debug!("Logout bypassed");
        Ok(())
    }

    fn name(&self) -> &str {
        "bypass"
    }
}
