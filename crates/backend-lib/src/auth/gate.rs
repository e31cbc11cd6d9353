// ============================
// crates/backend-lib/src/auth/gate.rs
// ============================
//! Authorization gate: authentication and role checks for protected
//! operations.
use crate::auth::session::SessionManager;
use crate::error::AppError;
use crate::metrics::ROLE_DENIED;
use crate::storage::UserDirectory;
use chatterd_common::{AccountId, Role};
use metrics::counter;
use tracing::warn;

/// Outcome of an authentication check.
///
/// Explicit result rather than an unwinding error: the boundary layer
/// decides how to redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCheck {
    Authenticated(AccountId),
    /// No authenticated session. Carries the session token (opened on the
    /// spot when the caller had none) that now stores the post-login
    /// redirect.
    Unauthenticated { session_token: String },
}

/// Check that the token belongs to an authenticated session.
///
/// When it does not, the requested path is recorded as the post-login
/// redirect so the login flow can return the caller to where they were
/// headed.
pub fn require_authenticated(
    sessions: &SessionManager,
    token: Option<&str>,
    requested: &str,
) -> AuthCheck {
    if let Some(token) = token {
        if let Some(account_id) = sessions.account_id(token) {
            return AuthCheck::Authenticated(account_id);
        }
    }

    let session_token = match token {
        Some(token) => token.to_string(),
        None => sessions.open(),
    };
    sessions.set_post_login_redirect(&session_token, requested);
    AuthCheck::Unauthenticated { session_token }
}

/// Check that the account currently holds one of the allowed roles.
///
/// The role is re-read from the user directory on every call rather than
/// taken from the session cache, so a downgrade takes effect mid-session.
/// A missing account is access denied, never a bypass.
pub async fn require_role(
    directory: &dyn UserDirectory,
    account_id: AccountId,
    allowed: &[Role],
) -> Result<Role, AppError> {
    let account = directory
        .find_by_id(account_id)
        .await?
        .ok_or(AppError::Forbidden)?;

    if allowed.contains(&account.role) {
        Ok(account.role)
    } else {
        warn!(account_id, role = %account.role, "role check denied");
        counter!(ROLE_DENIED).increment(1);
        Err(AppError::Forbidden)
    }
}
