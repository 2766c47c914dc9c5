//! Waitlist
//!
//! Pre-launch interest capture: an email waitlist subscription and a
//! lightweight contributor-interest record, each deduplicated by normalized
//! email with a best-effort notification email on success.

use crate::email::EmailClient;
use crate::error::AuthError;
use crate::models::normalize_email;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

// ============================================
// Request DTOs
// ============================================

/// Waitlist subscription request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// Contributor-interest request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContributeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

// ============================================
// Storage
// ============================================

/// Storage contract for waitlist records
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Record a subscriber; [`AuthError::AlreadyOnWaitlist`] on repeat
    async fn add_subscriber(&self, email: &str) -> Result<(), AuthError>;

    /// Record a contributor interest; [`AuthError::AlreadyOnWaitlist`] on repeat
    async fn add_contributor(&self, name: &str, email: &str) -> Result<(), AuthError>;
}

/// PostgreSQL-backed waitlist store
pub struct PgWaitlistStore {
    db: PgPool,
}

impl PgWaitlistStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the waitlist tables and their unique email indexes
    pub async fn run_migrations(db: &PgPool) -> Result<(), AuthError> {
        tracing::info!("Running waitlist migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS waitlist_subscribers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS waitlist_contributors (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AuthError::AlreadyOnWaitlist
        }
        _ => AuthError::from(err),
    }
}

#[async_trait]
impl WaitlistStore for PgWaitlistStore {
    async fn add_subscriber(&self, email: &str) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO waitlist_subscribers (email) VALUES ($1)")
            .bind(normalize_email(email))
            .execute(&self.db)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn add_contributor(&self, name: &str, email: &str) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO waitlist_contributors (name, email) VALUES ($1, $2)")
            .bind(name)
            .bind(normalize_email(email))
            .execute(&self.db)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }
}

// ============================================
// Service
// ============================================

/// Waitlist operations: store the record, then notify by email. Delivery
/// failures are logged and do not fail the request.
pub struct WaitlistService {
    store: Arc<dyn WaitlistStore>,
    email: Arc<EmailClient>,
}

impl WaitlistService {
    pub fn new(store: Arc<dyn WaitlistStore>, email: Arc<EmailClient>) -> Self {
        Self { store, email }
    }

    pub async fn subscribe(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        self.store.add_subscriber(&email).await?;

        tracing::info!("Waitlist subscriber added");

        let result = self
            .email
            .send(
                &email,
                "Welcome to Aedura - you're on the waitlist!",
                "<p>Thank you for joining the Aedura waitlist. We'll let you know the moment early access opens.</p>",
            )
            .await;
        if !result.success {
            tracing::warn!(error = ?result.error, "Waitlist confirmation email not sent");
        }

        Ok(())
    }

    pub async fn contribute(&self, name: &str, email: &str) -> Result<(), AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        let email = normalize_email(email);
        self.store.add_contributor(name, &email).await?;

        tracing::info!("Waitlist contributor added");

        let result = self
            .email
            .send(
                &email,
                "Thank you for your contribution",
                &format!("<p>Dear {name},</p><p>Thank you for offering to contribute. We appreciate your support and will be in touch soon.</p>"),
            )
            .await;
        if !result.success {
            tracing::warn!(error = ?result.error, "Contributor notification email not sent");
        }

        Ok(())
    }
}

// ============================================
// In-Memory Store (tests)
// ============================================
