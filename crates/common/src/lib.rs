// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `chatterd` server and its clients.
//! This module defines the HTTP request/response bodies and the closed
//! role enumerations used for authorization decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier type
pub type AccountId = i64;

/// Authorization level of an account.
///
/// Roles form a closed set so that privilege checks can match exhaustively
/// instead of comparing free-form strings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a chat message within a conversation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Body of `POST /auth/register`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Optional display name; the local part of the email is used when absent
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response to a successful registration.
/// Registering never establishes a session by itself.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub account_id: AccountId,
}

/// Body of `POST /auth/login`
/// # Fields
/// * `identifier` - Email address or display name
/// * `password` - The account password
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Response to a successful login.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    /// Opaque session token; send back in the `x-session-token` header
    pub session_token: String,
    /// Where the client should navigate next (the originally requested
    /// page when the login was a detour, otherwise the latest conversation)
    pub redirect_to: String,
}

/// Body of `POST /chat/send`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    pub message: String,
}

/// Response to `POST /chat/send` carrying the assistant reply.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageResponse {
    pub conversation_id: Uuid,
    pub reply: String,
}

/// Response to `POST /chat/new`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewConversationResponse {
    pub conversation_id: Uuid,
}

/// A single message as returned by `GET /chat/{id}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageView {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Conversation metadata plus its messages, as returned by `GET /chat/{id}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversationView {
    pub conversation_id: Uuid,
    pub title: Option<String>,
    pub messages: Vec<MessageView>,
}

/// One account row in the admin listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountSummary {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
