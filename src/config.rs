//! Application Configuration
//!
//! All configuration values are loaded from environment variables once at
//! startup and injected into the services that need them. Nothing in the
//! request path reads ambient environment state.

use crate::error::AuthError;
use std::env;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret key for signing session tokens (from JWT_SECRET)
    pub jwt_secret: String,

    /// Session token lifetime in seconds (from SESSION_TTL)
    pub session_ttl: i64,

    /// Token issuer claim (from JWT_ISSUER)
    pub jwt_issuer: String,

    /// Token audience claim (from JWT_AUDIENCE)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost, iterations (from ARGON2_TIME_COST)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM)
    pub argon2_parallelism: u32,

    /// Minimum password length (from MIN_PASSWORD_LENGTH)
    pub min_password_length: usize,

    /// Mark the session cookie `Secure` (true when APP_ENV=production)
    pub cookie_secure: bool,

    /// Enable the legacy GET login variant (from ALLOW_QUERY_LOGIN).
    /// Query-parameter credentials end up in intermediary logs; this is a
    /// test-only convenience and defaults to off.
    pub allow_query_login: bool,

    /// PostgreSQL connection string (from DATABASE_URL)
    pub database_url: String,

    /// Listen address for the HTTP server (from BIND_ADDR)
    pub bind_addr: String,

    /// API key for the transactional email provider (from RESEND_API_KEY)
    pub resend_api_key: Option<String>,

    /// Sender address for waitlist notifications (from EMAIL_FROM)
    pub email_from: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").map_err(|_| {
                AuthError::Config("JWT_SECRET environment variable is not set".to_string())
            })?,

            session_ttl: env::var("SESSION_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400), // 24 hours

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "aedura".to_string()),

            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "aedura-web".to_string()),

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            min_password_length: env::var("MIN_PASSWORD_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),

            cookie_secure: env::var("APP_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),

            allow_query_login: env::var("ALLOW_QUERY_LOGIN")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),

            database_url: env::var("DATABASE_URL").map_err(|_| {
                AuthError::Config("DATABASE_URL environment variable is not set".to_string())
            })?,

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            resend_api_key: env::var("RESEND_API_KEY").ok(),

            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Aedura <onboarding@resend.dev>".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.session_ttl <= 0 {
            return Err(AuthError::Config(
                "SESSION_TTL must be positive".to_string(),
            ));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        if self.argon2_parallelism == 0 {
            return Err(AuthError::Config(
                "ARGON2_PARALLELISM must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Deterministic configuration with cheap hashing for unit tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "a".repeat(32),
            session_ttl: 86400,
            jwt_issuer: "aedura".to_string(),
            jwt_audience: "aedura-web".to_string(),
            argon2_memory_cost: 4096,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            min_password_length: 8,
            cookie_secure: false,
            allow_query_login: false,
            database_url: "postgres://localhost/aedura_test".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            resend_api_key: None,
            email_from: "Aedura <onboarding@resend.dev>".to_string(),
        }
    }
}
