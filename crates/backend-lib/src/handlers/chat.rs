// ============================
// chatterd-backend-lib/src/handlers/chat.rs
// ============================
//! Conversation endpoints: create, view, send.
use crate::auth::{require_authenticated, AuthCheck};
use crate::chat::ChatMessage;
use crate::error::AppError;
use crate::handlers::{login_required, session_token};
use crate::metrics::CHAT_MESSAGE;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chatterd_common::{
    ChatRole, ConversationView, MessageView, NewConversationResponse, SendMessageRequest,
    SendMessageResponse,
};
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

/// Conversation titles keep this many characters of the first message
const TITLE_MAX_CHARS: usize = 60;

/// `POST /chat/new`
pub async fn new_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = session_token(&headers);
    let account_id = match require_authenticated(&state.sessions, token.as_deref(), "/chat/new") {
        AuthCheck::Authenticated(id) => id,
        AuthCheck::Unauthenticated { session_token } => {
            return Ok(login_required(session_token))
        },
    };

    let conversation_id = state.conversations.create(account_id).await?;
    Ok(Json(NewConversationResponse { conversation_id }).into_response())
}

/// `GET /chat/{id}`
pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = session_token(&headers);
    let requested = format!("/chat/{id}");
    let account_id = match require_authenticated(&state.sessions, token.as_deref(), &requested) {
        AuthCheck::Authenticated(id) => id,
        AuthCheck::Unauthenticated { session_token } => {
            return Ok(login_required(session_token))
        },
    };

    let conversation = state
        .conversations
        .find_for_user(id, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;

    let messages = state
        .conversations
        .messages(id)
        .await?
        .into_iter()
        .map(|message| MessageView {
            role: message.role,
            content: message.content,
            created_at: message.created_at,
        })
        .collect();

    Ok(Json(ConversationView {
        conversation_id: conversation.id,
        title: conversation.title,
        messages,
    })
    .into_response())
}

/// `POST /chat/send`
///
/// Appends the user message, titles the conversation from its first user
/// message, asks the gateway for a reply and persists it.
pub async fn send(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SendMessageRequest>,
) -> Result<Response, AppError> {
    let token = session_token(&headers);
    let requested = format!("/chat/{}", request.conversation_id);
    let account_id = match require_authenticated(&state.sessions, token.as_deref(), &requested) {
        AuthCheck::Authenticated(id) => id,
        AuthCheck::Unauthenticated { session_token } => {
            return Ok(login_required(session_token))
        },
    };

    let id = request.conversation_id;
    let conversation = state
        .conversations
        .find_for_user(id, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;

    state
        .conversations
        .append_message(id, ChatRole::User, &request.message)
        .await?;

    if conversation.title.is_none() {
        let source = state
            .conversations
            .first_user_message(id)
            .await?
            .unwrap_or_else(|| request.message.clone());
        state
            .conversations
            .update_title(id, &truncate_title(&source))
            .await?;
    }

    // recent history only, capped to keep request cost bounded
    let mut history = vec![ChatMessage {
        role: ChatRole::System,
        content: state.settings.gateway.system_prompt.clone(),
    }];
    history.extend(
        state
            .conversations
            .history_for_model(id, state.settings.gateway.history_limit)
            .await?,
    );

    let reply = state.gateway.complete(&history).await?;
    state
        .conversations
        .append_message(id, ChatRole::Assistant, &reply)
        .await?;

    counter!(CHAT_MESSAGE).increment(1);
    Ok(Json(SendMessageResponse {
        conversation_id: id,
        reply,
    })
    .into_response())
}

/// Shorten a first message into a conversation title.
fn truncate_title(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= TITLE_MAX_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short message"), "short message");
        assert_eq!(truncate_title("  padded  "), "padded");

        let long = "x".repeat(80);
        let title = truncate_title(&long);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 1);
        assert!(title.ends_with('…'));
    }
}
