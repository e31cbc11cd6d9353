use crate::auth::lockout::LockoutTracker;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionManager;
use crate::auth::validate::{
    normalize_email, validate_email, validate_password, PasswordRequirements,
};
use crate::auth::IdentityService;
use crate::error::AppError;
use crate::metrics::{LOCKOUT_TRIGGERED, LOGIN_FAILURE, LOGIN_SUCCESS, REGISTER_CREATED};
use crate::storage::UserDirectory;
use async_trait::async_trait;
use chatterd_common::AccountId;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};

/// Default implementation of [`IdentityService`], composing the credential
/// validator, password hasher, lockout tracker and session manager over an
/// injected user directory.
pub struct DefaultIdentity {
    directory: Arc<dyn UserDirectory>,
    lockout: LockoutTracker,
    sessions: SessionManager,
    requirements: PasswordRequirements,
}

impl DefaultIdentity {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        lockout: LockoutTracker,
        sessions: SessionManager,
        requirements: PasswordRequirements,
    ) -> Self {
        Self {
            directory,
            lockout,
            sessions,
            requirements,
        }
    }
}

#[async_trait]
impl IdentityService for DefaultIdentity {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AccountId, AppError> {
        let email = normalize_email(email);

        // collect every violation before failing, so the caller can render
        // all of them at once
        let mut violations = Vec::new();
        if !validate_email(&email) {
            violations.push("Invalid email address".to_string());
        }
        violations.extend(
            validate_password(password, &self.requirements)
                .into_iter()
                .map(|rule| rule.to_string()),
        );
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        // best-effort pre-check; the directory's uniqueness constraint is
        // the final authority under concurrent registration
        if self.directory.email_exists(&email).await? {
            return Err(AppError::Conflict);
        }

        let hash = hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;

        let display_name = match display_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            // default to the local part of the email
            None => email.split('@').next().unwrap_or(&email).to_string(),
        };

        let id = self
            .directory
            .insert_account(&email, &hash, &display_name)
            .await?;

        info!(account_id = id, "account registered");
        counter!(REGISTER_CREATED).increment(1);
        Ok(id)
    }

    async fn authenticate(
        &self,
        session_token: &str,
        identifier: &str,
        password: &str,
        origin: &str,
    ) -> Result<AccountId, AppError> {
        let identifier = identifier.trim();

        // locked out callers get no password comparison at all: no wasted
        // hash computation, no timing signal
        if self.lockout.is_locked_out(identifier).await? {
            counter!(LOGIN_FAILURE).increment(1);
            return Err(AppError::LockedOut {
                minutes: self.lockout.window_minutes(),
            });
        }

        let account = match self.directory.find_by_identifier(identifier).await? {
            Some(account) if verify_password(&account.password_hash, password) => account,
            // unknown identifier and wrong password take the same path so
            // the caller cannot tell them apart
            _ => {
                self.lockout.record_failed_attempt(identifier, origin).await?;
                let remaining = self.lockout.remaining_attempts(identifier).await?;
                warn!(identifier, origin, remaining, "failed login attempt");
                counter!(LOGIN_FAILURE).increment(1);

                if remaining == 0 {
                    counter!(LOCKOUT_TRIGGERED).increment(1);
                    return Err(AppError::LockedOut {
                        minutes: self.lockout.window_minutes(),
                    });
                }
                return Err(AppError::InvalidCredentials { remaining });
            },
        };

        self.lockout.clear_failed_attempts(identifier).await?;
        self.sessions
            .establish(session_token, account.id, &account.display_name, account.role);

        info!(account_id = account.id, "login succeeded");
        counter!(LOGIN_SUCCESS).increment(1);
        Ok(account.id)
    }

    fn logout(&self, session_token: &str) {
        self.sessions.destroy(session_token);
    }
}
