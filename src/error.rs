//! Error Types
//!
//! Centralized error handling for signup, login, and waitlist operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors surfaced by the signup and session core
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("An account with this email already exists")]
    EmailExists,

    #[error("This email is already on the waitlist")]
    AlreadyOnWaitlist,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string()),
            AuthError::EmailExists => (StatusCode::CONFLICT, "email_exists", self.to_string()),
            AuthError::AlreadyOnWaitlist => (
                StatusCode::CONFLICT,
                "already_on_waitlist",
                self.to_string(),
            ),
            // Configuration and storage detail is logged server-side only;
            // the client sees an opaque message.
            AuthError::Config(_) | AuthError::Database(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("Token error: {:?}", err);
        AuthError::InvalidToken
    }
}
