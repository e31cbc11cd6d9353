// ============================
// chatterd-backend-lib/src/router.rs
// ============================
//! HTTP router wiring the handlers to the application state.
use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/chat/new", post(handlers::chat::new_conversation))
        .route("/chat/send", post(handlers::chat::send))
        .route("/chat/{id}", get(handlers::chat::view))
        .route("/admin/users", get(handlers::admin::list_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe
async fn health() -> &'static str {
    "ok"
}
