// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed email or a password that misses the policy. Carries every
    /// violated rule so callers can render complete guidance at once.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Email or display name already registered. Deliberately does not say
    /// which of the two collided.
    #[error("Already in use")]
    Conflict,

    /// Identifier over the failed-attempt threshold within the window.
    #[error("Locked out for {minutes} minutes")]
    LockedOut { minutes: i64 },

    /// Wrong password or unknown identifier; the two are indistinguishable.
    #[error("Invalid credentials ({remaining} attempts remaining)")]
    InvalidCredentials { remaining: u32 },

    /// No active session on a protected operation.
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated but the role does not allow the operation.
    #[error("Access denied")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying persistence failure. Never recovered locally; lockout
    /// recording fails closed on this.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Language-model gateway failure.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::LockedOut { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials { .. } | AppError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            },
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict => "CONFLICT_001",
            AppError::LockedOut { .. } => "AUTH_003",
            AppError::InvalidCredentials { .. } => "AUTH_002",
            AppError::Unauthenticated => "AUTH_001",
            AppError::Forbidden => "AUTH_004",
            AppError::NotFound(_) => "NF_001",
            AppError::Storage(_) => "STORE_001",
            AppError::ServiceUnavailable(_) => "GW_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use.
    ///
    /// Security-sensitive failures are normalized here: lockout and
    /// invalid-credential messages never reveal whether the account exists,
    /// and the conflict message never says which field collided.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(rules) => rules.join(", "),
            AppError::Conflict => "Already in use".to_string(),
            AppError::LockedOut { minutes } => format!(
                "Too many failed login attempts, please try again in {minutes} minutes"
            ),
            AppError::InvalidCredentials { remaining } => format!(
                "Invalid email/username or password ({remaining} attempts remaining)"
            ),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::ServiceUnavailable(_) => "AI service is unavailable".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Storage(_) | AppError::Internal(_) | AppError::Io(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        // Validation failures additionally carry the full list of violated
        // rules as structured data so the caller can render all of them.
        let body = match &self {
            AppError::Validation(rules) => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "violations": rules,
                }
            }),
            _ => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_app_error_display() {
        let locked = AppError::LockedOut { minutes: 60 };
        assert_eq!(locked.to_string(), "Locked out for 60 minutes");

        let invalid = AppError::InvalidCredentials { remaining: 2 };
        assert_eq!(
            invalid.to_string(),
            "Invalid credentials (2 attempts remaining)"
        );

        let io_error = AppError::Io(IoError::new(ErrorKind::NotFound, "File not found"));
        assert!(io_error.to_string().contains("IO error"));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation(vec!["bad".into()]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::LockedOut { minutes: 60 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::InvalidCredentials { remaining: 1 }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::ServiceUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Storage("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sanitized_messages_do_not_leak() {
        // Lockout and invalid-credential messages must not differ based on
        // whether the underlying account exists.
        let unknown = AppError::InvalidCredentials { remaining: 2 };
        let known = AppError::InvalidCredentials { remaining: 2 };
        assert_eq!(unknown.sanitized_message(), known.sanitized_message());

        // Conflict message must not say which field collided
        assert_eq!(AppError::Conflict.sanitized_message(), "Already in use");

        // Storage details are never surfaced
        let storage = AppError::Storage("permission denied on /var/data".into());
        assert!(!storage.sanitized_message().contains("/var/data"));
    }

    #[test]
    fn test_app_error_into_response() {
        let error = AppError::NotFound("Resource not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_from_impls() {
        let io_err = IoError::new(ErrorKind::PermissionDenied, "Permission denied");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));

        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));

        let string_err = "String error".to_string();
        let app_err: AppError = string_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
