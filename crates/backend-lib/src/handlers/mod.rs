// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers for the `chatterd` server.

pub mod admin;
pub mod auth;
pub mod chat;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Header carrying the opaque transport session token
pub const SESSION_HEADER: &str = "x-session-token";

/// Session token from the request headers, if the client sent one.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|token| !token.is_empty())
}

/// Origin address for failed-attempt records: first `x-forwarded-for` hop,
/// `"unknown"` when absent.
pub(crate) fn client_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Redirect-and-stop response for unauthenticated callers. Carries the
/// session token that now holds the post-login redirect, so the caller can
/// present it again after logging in.
pub(crate) fn login_required(session_token: String) -> Response {
    let body = serde_json::json!({
        "error": {
            "code": "AUTH_001",
            "message": "Authentication required",
        },
        "login": "/auth/login",
        "session_token": session_token,
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
