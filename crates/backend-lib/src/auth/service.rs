use crate::error::AppError;
use async_trait::async_trait;
use chatterd_common::AccountId;

/// Single entry point for identity operations, used by the HTTP handlers.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create a new account. Never establishes a session; callers decide
    /// whether to auto-login.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AccountId, AppError>;

    /// Verify credentials for an email or display name and bind the
    /// identity to `session_token` on success.
    async fn authenticate(
        &self,
        session_token: &str,
        identifier: &str,
        password: &str,
        origin: &str,
    ) -> Result<AccountId, AppError>;

    /// Destroy the session. Idempotent.
    fn logout(&self, session_token: &str);
}
