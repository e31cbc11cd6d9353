// ============================
// chatterd-backend-lib/src/handlers/admin.rs
// ============================
//! Admin endpoints, gated on the `admin` role.
use crate::auth::{require_authenticated, require_role, AuthCheck};
use crate::error::AppError;
use crate::handlers::{login_required, session_token};
use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chatterd_common::{AccountSummary, Role};
use std::sync::Arc;

/// `GET /admin/users`
///
/// The role is re-read from the user directory by the gate on every call,
/// so a downgrade locks the caller out mid-session.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = session_token(&headers);
    let account_id = match require_authenticated(&state.sessions, token.as_deref(), "/admin/users")
    {
        AuthCheck::Authenticated(id) => id,
        AuthCheck::Unauthenticated { session_token } => {
            return Ok(login_required(session_token))
        },
    };

    require_role(state.directory.as_ref(), account_id, &[Role::Admin]).await?;

    let accounts = state
        .directory
        .list_accounts()
        .await?
        .into_iter()
        .map(|account| AccountSummary {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            role: account.role,
            created_at: account.created_at,
        })
        .collect::<Vec<_>>();

    Ok(Json(accounts).into_response())
}
