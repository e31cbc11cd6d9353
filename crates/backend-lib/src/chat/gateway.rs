// ============================
// chatterd-backend-lib/src/chat/gateway.rs
// ============================
//! Outbound completion gateway.
//!
//! The wire format of the provider is deliberately opaque to the rest of
//! the system: callers hand over conversation history and get reply text or
//! a service-unavailable error. Retry policy belongs to the caller.
use crate::config::GatewaySettings;
use crate::error::AppError;
use crate::metrics::GATEWAY_FAILURE;
use async_trait::async_trait;
use chatterd_common::ChatRole;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::error;

/// One message as sent to the completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Trait for completion backends
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Produce a reply for the given conversation history.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError>;
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiGateway {
    http: reqwest::Client,
    /// Missing key is tolerated at construction; `complete` then fails
    /// with a service-unavailable error
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiGateway {
    /// Build a gateway from settings, reading the API key from the
    /// `OPENAI_API_KEY` environment variable.
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            error!("OPENAI_API_KEY is not set; completions will be unavailable");
        }

        Self {
            http: reqwest::Client::new(),
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            temperature: settings.temperature,
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        if messages.is_empty() {
            return Err(AppError::Internal(
                "completion requested with no messages".to_string(),
            ));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            counter!(GATEWAY_FAILURE).increment(1);
            return Err(AppError::ServiceUnavailable(
                "AI service is not configured".to_string(),
            ));
        };

        let payload = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                counter!(GATEWAY_FAILURE).increment(1);
                AppError::ServiceUnavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            counter!(GATEWAY_FAILURE).increment(1);
            return Err(AppError::ServiceUnavailable(format!(
                "completion endpoint returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            counter!(GATEWAY_FAILURE).increment(1);
            AppError::ServiceUnavailable(e.to_string())
        })?;

        let reply = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                counter!(GATEWAY_FAILURE).increment(1);
                AppError::ServiceUnavailable("malformed completion response".to_string())
            })?;

        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySettings;

    #[tokio::test]
    async fn test_unconfigured_gateway_is_unavailable() {
        let gateway = OpenAiGateway {
            http: reqwest::Client::new(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.3,
        };
        let result = gateway
            .complete(&[ChatMessage {
                role: ChatRole::User,
                content: "hello".to_string(),
            }])
            .await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_history_is_rejected() {
        let gateway = OpenAiGateway::from_settings(&GatewaySettings::default());
        let result = gateway.complete(&[]).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = GatewaySettings {
            base_url: "https://api.openai.com/v1/".to_string(),
            ..GatewaySettings::default()
        };
        let gateway = OpenAiGateway::from_settings(&settings);
        assert_eq!(gateway.base_url, "https://api.openai.com/v1");
    }
}
