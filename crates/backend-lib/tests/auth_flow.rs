// ==============================
// crates/backend-lib/tests/auth_flow.rs
// ==============================
//! End-to-end identity flows over real flat-file storage.
use backend_lib::auth::{
    DefaultIdentity, IdentityService, LockoutTracker, PasswordRequirements, SessionManager,
};
use backend_lib::error::AppError;
use backend_lib::storage::{FlatFileAttemptLog, FlatFileDirectory, UserDirectory};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    identity: DefaultIdentity,
    sessions: SessionManager,
    directory: FlatFileDirectory,
    _dir: TempDir,
}

fn setup() -> Fixture {
    let dir = TempDir::new().unwrap();
    let directory = FlatFileDirectory::new(dir.path()).unwrap();
    let attempts = Arc::new(FlatFileAttemptLog::new(dir.path()).unwrap());
    let sessions = SessionManager::new();
    let identity = DefaultIdentity::new(
        Arc::new(directory.clone()),
        LockoutTracker::with_defaults(attempts),
        sessions.clone(),
        PasswordRequirements::default(),
    );
    Fixture {
        identity,
        sessions,
        directory,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_register_then_duplicate_differing_only_in_case() {
    let fx = setup();

    let id = fx
        .identity
        .register("User@Example.com", "Abc12345!", None)
        .await
        .unwrap();
    assert!(id > 0);

    // same address, different case: same identity
    let duplicate = fx
        .identity
        .register("user@example.com", "Xyz98765?", None)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict)));
}

#[tokio::test]
async fn test_register_reports_every_violation_at_once() {
    let fx = setup();

    let result = fx.identity.register("not-an-email", "short", None).await;
    let Err(AppError::Validation(violations)) = result else {
        panic!("expected a validation error");
    };
    // bad email + too short + no uppercase + no digit + no special
    assert_eq!(violations.len(), 5);
    assert!(violations.iter().any(|rule| rule.contains("email")));
    assert!(violations.iter().any(|rule| rule.contains("8 characters")));
}

#[tokio::test]
async fn test_register_defaults_display_name_to_local_part() {
    let fx = setup();

    let id = fx
        .identity
        .register("carol.smith@example.com", "Abc12345!", None)
        .await
        .unwrap();

    let account = fx.directory.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(account.display_name, "carol.smith");

    // and the default name works as a login identifier
    let token = fx.sessions.open();
    let authenticated = fx
        .identity
        .authenticate(&token, "carol.smith", "Abc12345!", "203.0.113.9")
        .await
        .unwrap();
    assert_eq!(authenticated, id);
}

#[tokio::test]
async fn test_lockout_after_three_failures_blocks_correct_password() {
    let fx = setup();
    fx.identity
        .register("alice@example.com", "Abc12345!", None)
        .await
        .unwrap();
    let token = fx.sessions.open();

    // first two failures count down the remaining attempts
    for expected_remaining in [2u32, 1] {
        let err = fx
            .identity
            .authenticate(&token, "alice@example.com", "WrongPass1!", "203.0.113.9")
            .await
            .unwrap_err();
        let AppError::InvalidCredentials { remaining } = err else {
            panic!("expected invalid credentials, got {err}");
        };
        assert_eq!(remaining, expected_remaining);
    }

    // the third failure reports the lockout
    let third = fx
        .identity
        .authenticate(&token, "alice@example.com", "WrongPass1!", "203.0.113.9")
        .await
        .unwrap_err();
    assert!(matches!(third, AppError::LockedOut { minutes: 60 }));

    // even the correct password is refused while locked out
    let fourth = fx
        .identity
        .authenticate(&token, "alice@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap_err();
    assert!(matches!(fourth, AppError::LockedOut { .. }));
    assert!(fx.sessions.identity(&token).is_none());
}

#[tokio::test]
async fn test_unknown_identifier_indistinguishable_from_wrong_password() {
    let fx = setup();
    fx.identity
        .register("alice@example.com", "Abc12345!", None)
        .await
        .unwrap();
    let token = fx.sessions.open();

    let unknown = fx
        .identity
        .authenticate(&token, "nobody@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap_err();
    let wrong = fx
        .identity
        .authenticate(&token, "alice@example.com", "WrongPass1!", "203.0.113.9")
        .await
        .unwrap_err();

    // both surfaced messages look identical apart from the counter
    assert!(matches!(
        unknown,
        AppError::InvalidCredentials { remaining: 2 }
    ));
    assert!(matches!(wrong, AppError::InvalidCredentials { remaining: 2 }));

    // and unknown identifiers accumulate toward their own lockout
    for _ in 0..2 {
        let _ = fx
            .identity
            .authenticate(&token, "nobody@example.com", "Abc12345!", "203.0.113.9")
            .await;
    }
    let locked = fx
        .identity
        .authenticate(&token, "nobody@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap_err();
    assert!(matches!(locked, AppError::LockedOut { .. }));
}

#[tokio::test]
async fn test_successful_login_clears_failed_attempts() {
    let fx = setup();
    fx.identity
        .register("alice@example.com", "Abc12345!", None)
        .await
        .unwrap();
    let token = fx.sessions.open();

    for _ in 0..2 {
        let _ = fx
            .identity
            .authenticate(&token, "alice@example.com", "WrongPass1!", "203.0.113.9")
            .await;
    }

    fx.identity
        .authenticate(&token, "alice@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap();

    // the slate is clean again: the next failure counts from the top
    let err = fx
        .identity
        .authenticate(&token, "alice@example.com", "WrongPass1!", "203.0.113.9")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials { remaining: 2 }));
}

#[tokio::test]
async fn test_login_establishes_session_and_logout_is_idempotent() {
    let fx = setup();
    let id = fx
        .identity
        .register("alice@example.com", "Abc12345!", None)
        .await
        .unwrap();

    // registration alone establishes nothing
    let token = fx.sessions.open();
    assert!(fx.sessions.identity(&token).is_none());

    fx.identity
        .authenticate(&token, "alice@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap();
    assert_eq!(fx.sessions.account_id(&token), Some(id));

    fx.identity.logout(&token);
    assert!(fx.sessions.identity(&token).is_none());

    // a second logout observes no session and changes nothing
    fx.identity.logout(&token);
    assert!(fx.sessions.identity(&token).is_none());
}

#[tokio::test]
async fn test_post_login_redirect_round_trip() {
    let fx = setup();
    fx.identity
        .register("alice@example.com", "Abc12345!", None)
        .await
        .unwrap();

    // an unauthenticated visit to a protected page records the target
    let check = backend_lib::auth::require_authenticated(&fx.sessions, None, "/chat/42");
    let backend_lib::auth::AuthCheck::Unauthenticated { session_token } = check else {
        panic!("expected unauthenticated");
    };

    fx.identity
        .authenticate(&session_token, "alice@example.com", "Abc12345!", "203.0.113.9")
        .await
        .unwrap();

    // the detour target survives the login and is consumed exactly once
    assert_eq!(
        fx.sessions
            .consume_post_login_redirect(&session_token)
            .as_deref(),
        Some("/chat/42")
    );
    assert!(fx
        .sessions
        .consume_post_login_redirect(&session_token)
        .is_none());
}
