// ============================
// chatterd-backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login and logout endpoints.
use crate::error::AppError;
use crate::handlers::{client_origin, session_token};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chatterd_common::{AccountId, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use std::sync::Arc;

/// `POST /auth/register`
///
/// Creates the account but establishes no session; the client decides
/// whether to log in right away.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let account_id = state
        .identity
        .register(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { account_id })).into_response())
}

/// `POST /auth/login`
///
/// On success the response carries the session token and where to go next:
/// the originally requested page when the login was a detour, otherwise the
/// caller's most recent conversation.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let token = session_token(&headers).unwrap_or_else(|| state.sessions.open());
    let origin = client_origin(&headers);

    let account_id = state
        .identity
        .authenticate(&token, &request.identifier, &request.password, &origin)
        .await?;

    let redirect_to = match state.sessions.consume_post_login_redirect(&token) {
        Some(target) => target,
        None => default_conversation_redirect(&state, account_id).await?,
    };

    Ok(Json(LoginResponse {
        session_token: token,
        redirect_to,
    })
    .into_response())
}

/// Most recent conversation path, creating a conversation on demand when
/// the account has none yet.
async fn default_conversation_redirect(
    state: &AppState,
    account_id: AccountId,
) -> Result<String, AppError> {
    let conversation_id = match state.conversations.latest_for_user(account_id).await? {
        Some(id) => id,
        None => state.conversations.create(account_id).await?,
    };
    Ok(format!("/chat/{conversation_id}"))
}

/// `POST /auth/logout`
///
/// Unconditional and idempotent: calling with no active session is a no-op.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.identity.logout(&token);
    }
    StatusCode::NO_CONTENT.into_response()
}
