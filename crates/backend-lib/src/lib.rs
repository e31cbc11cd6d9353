// ============================
// chatterd-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `chatterd` chat server.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod storage;

use crate::auth::{DefaultIdentity, IdentityService, LockoutTracker, SessionManager};
use crate::chat::{CompletionGateway, ConversationStore, FlatFileChatStore, OpenAiGateway};
use crate::config::Settings;
use crate::storage::{AttemptStore, FlatFileAttemptLog, FlatFileDirectory, UserDirectory};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings manager
    pub settings: Arc<Settings>,
    /// Account storage
    pub directory: Arc<dyn UserDirectory>,
    /// Session manager
    pub sessions: SessionManager,
    /// Identity & access facade
    pub identity: Arc<dyn IdentityService>,
    /// Conversation storage
    pub conversations: Arc<dyn ConversationStore>,
    /// Completion gateway
    pub gateway: Arc<dyn CompletionGateway>,
}

impl AppState {
    /// Create a new application state from injected backends
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        attempts: Arc<dyn AttemptStore>,
        conversations: Arc<dyn ConversationStore>,
        gateway: Arc<dyn CompletionGateway>,
        settings: Settings,
    ) -> Self {
        let sessions = SessionManager::new();
        let lockout = LockoutTracker::new(
            attempts,
            settings.lockout.max_attempts,
            settings.lockout.window_minutes,
        );
        let identity = Arc::new(DefaultIdentity::new(
            directory.clone(),
            lockout,
            sessions.clone(),
            settings.password_requirements.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            directory,
            sessions,
            identity,
            conversations,
            gateway,
        }
    }

    /// Create an application state with flat-file storage rooted at the
    /// settings' data directory and an OpenAI-style gateway.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let directory = Arc::new(FlatFileDirectory::new(&settings.data_dir)?);
        let attempts = Arc::new(FlatFileAttemptLog::new(&settings.data_dir)?);
        let conversations = Arc::new(FlatFileChatStore::new(&settings.data_dir)?);
        let gateway = Arc::new(OpenAiGateway::from_settings(&settings.gateway));
        Ok(Self::new(directory, attempts, conversations, gateway, settings))
    }
}
