// ============================
// chatterd-backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::auth::validate::PasswordRequirements;
use anyhow::Result;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// Failed-attempt lockout policy
    pub lockout: LockoutSettings,
    /// Language-model gateway settings
    pub gateway: GatewaySettings,
}

/// Brute-force lockout policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockoutSettings {
    /// Failed attempts within the window before lockout
    pub max_attempts: u32,
    /// Sliding window over which attempts count, in minutes
    pub window_minutes: i64,
}

/// Settings for the external completion gateway
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Model name passed through to the provider
    pub model: String,
    /// Base URL of the provider API
    pub base_url: String,
    /// How many recent messages are sent as context
    pub history_limit: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// System prompt prepended to every completion request
    pub system_prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("static addr"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            password_requirements: PasswordRequirements::default(),
            lockout: LockoutSettings::default(),
            gateway: GatewaySettings::default(),
        }
    }
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_minutes: 60,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            history_limit: 12,
            temperature: 0.3,
            system_prompt: "You are a helpful assistant. Answer concisely.".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `config/default.*` merged with `CHATTERD_`
    /// prefixed environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from("config/default")
    }

    /// Load settings from an explicit config file path (extension optional).
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CHATTERD").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.lockout.max_attempts, 3);
        assert_eq!(settings.lockout.window_minutes, 60);
        assert_eq!(settings.gateway.history_limit, 12);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let settings = Settings::load_from("does-not-exist").unwrap();
        assert_eq!(settings.lockout.max_attempts, 3);
        assert_eq!(settings.password_requirements.min_length, 8);
    }
}
