// ============================
// chatterd-backend-lib/src/auth/session.rs
// ============================
//! Session state handling and management.
//!
//! Sessions are keyed by an opaque transport token. A session entry may be
//! anonymous (it only carries the post-login redirect target) or hold the
//! authenticated identity established by a successful login.
use crate::auth::token_generator::generate_secure_token;
use crate::metrics::SESSION_ACTIVE;
use chatterd_common::{AccountId, Role};
use dashmap::DashMap;
use metrics::gauge;
use std::sync::Arc;

/// The authenticated identity bound to a session
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub account_id: AccountId,
    /// Display name cached at login time, for greeting text only
    pub display_name: String,
    /// Role cached at login time. Privileged checks never trust this value;
    /// the authorization gate re-reads the role from the user directory.
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    identity: Option<SessionIdentity>,
    post_login_redirect: Option<String>,
}

/// Session manager keyed by transport session token
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionState>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Open an anonymous session and return its token.
    /// Anonymous sessions exist to carry the post-login redirect target.
    pub fn open(&self) -> String {
        let token = generate_secure_token();
        self.sessions.insert(token.clone(), SessionState::default());
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        token
    }

    /// Bind an authenticated identity to the token, replacing any identity
    /// already there (no stacking). A pending post-login redirect survives,
    /// that value exists precisely to outlive the login itself.
    pub fn establish(&self, token: &str, account_id: AccountId, display_name: &str, role: Role) {
        let mut entry = self.sessions.entry(token.to_string()).or_default();
        entry.identity = Some(SessionIdentity {
            account_id,
            display_name: display_name.to_string(),
            role,
        });
        drop(entry);
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
    }

    /// The authenticated identity for the token, if any. Side-effect free.
    pub fn identity(&self, token: &str) -> Option<SessionIdentity> {
        self.sessions
            .get(token)
            .and_then(|entry| entry.identity.clone())
    }

    /// Account id of the authenticated holder, if any.
    pub fn account_id(&self, token: &str) -> Option<AccountId> {
        self.identity(token).map(|identity| identity.account_id)
    }

    /// Cached role of the authenticated holder, if any.
    pub fn role(&self, token: &str) -> Option<Role> {
        self.identity(token).map(|identity| identity.role)
    }

    /// Remember the originally requested path across the login detour.
    pub fn set_post_login_redirect(&self, token: &str, target: &str) {
        let mut entry = self.sessions.entry(token.to_string()).or_default();
        entry.post_login_redirect = Some(target.to_string());
    }

    /// Read and clear the redirect target in one step, so it is used at
    /// most once.
    pub fn consume_post_login_redirect(&self, token: &str) -> Option<String> {
        self.sessions
            .get_mut(token)
            .and_then(|mut entry| entry.post_login_redirect.take())
    }

    /// Destroy the session. The whole entry goes in one map operation, so
    /// no request can observe a half-cleared session. Idempotent.
    pub fn destroy(&self, token: &str) {
        self.sessions.remove(token);
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_and_read_identity() {
        let sessions = SessionManager::new();
        let token = sessions.open();

        assert!(sessions.identity(&token).is_none());

        sessions.establish(&token, 7, "alice", Role::User);
        assert_eq!(sessions.account_id(&token), Some(7));
        assert_eq!(sessions.role(&token), Some(Role::User));
        assert_eq!(sessions.identity(&token).unwrap().display_name, "alice");
    }

    #[test]
    fn test_establish_replaces_previous_identity() {
        let sessions = SessionManager::new();
        let token = sessions.open();

        sessions.establish(&token, 1, "alice", Role::Admin);
        sessions.establish(&token, 2, "bob", Role::User);

        // no stacking: the second login wins outright
        assert_eq!(sessions.account_id(&token), Some(2));
        assert_eq!(sessions.role(&token), Some(Role::User));
    }

    #[test]
    fn test_redirect_survives_establish_and_is_consumed_once() {
        let sessions = SessionManager::new();
        let token = sessions.open();

        sessions.set_post_login_redirect(&token, "/chat/42");
        sessions.establish(&token, 7, "alice", Role::User);

        assert_eq!(
            sessions.consume_post_login_redirect(&token).as_deref(),
            Some("/chat/42")
        );
        // consumed exactly once
        assert!(sessions.consume_post_login_redirect(&token).is_none());
    }

    #[test]
    fn test_destroy_clears_everything_and_is_idempotent() {
        let sessions = SessionManager::new();
        let token = sessions.open();
        sessions.set_post_login_redirect(&token, "/chat/42");
        sessions.establish(&token, 7, "alice", Role::User);

        sessions.destroy(&token);
        assert!(sessions.identity(&token).is_none());
        assert!(sessions.consume_post_login_redirect(&token).is_none());

        // a second destroy observes nothing and changes nothing
        sessions.destroy(&token);
        assert!(sessions.identity(&token).is_none());
    }

    #[test]
    fn test_unknown_token_reads_as_none() {
        let sessions = SessionManager::new();
        assert!(sessions.identity("no-such-token").is_none());
        assert!(sessions.account_id("no-such-token").is_none());
        assert!(sessions.role("no-such-token").is_none());
    }
}
