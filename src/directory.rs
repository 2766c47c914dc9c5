//! User Directory
//!
//! Persistent store of user records keyed uniquely by normalized email.
//! The PostgreSQL implementation relies on a unique index so that of two
//! concurrent signups for the same address exactly one insert succeeds and
//! the other observes the duplicate; the prior existence check is a
//! fast-path courtesy, never the authority.

use crate::error::AuthError;
use crate::models::{normalize_email, NewUser, Profile, User};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Storage contract for user records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by email; the address is normalized before the query
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Insert a new user record.
    ///
    /// Fails with [`AuthError::EmailExists`] when the normalized email is
    /// already taken, enforced atomically at the storage layer.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;
}

// ============================================
// PostgreSQL Implementation
// ============================================

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    profile: Json<Profile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed user directory
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the users table and its unique email index
    pub async fn run_migrations(db: &PgPool) -> Result<(), AuthError> {
        tracing::info!("Running user directory migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role_type VARCHAR(16) NOT NULL,
                profile JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role_type ON users(role_type);")
            .execute(db)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, profile, created_at, updated_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password_hash, role_type, profile)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, profile, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.profile.role_type().as_str())
        .bind(Json(&user.profile))
        .fetch_one(&self.db)
        .await
        .map_err(|err| match &err {
            // The unique index is the authoritative duplicate signal
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::EmailExists
            }
            _ => AuthError::from(err),
        })?;

        Ok(User::from(row))
    }
}

// ============================================
// In-Memory Implementation (tests)
// ============================================


#[cfg(test)]
mod tests {
    use super::mock::MemoryUserDirectory;
    use super::*;
    use crate::models::{AdvisoryProfile, ContributorProfile, ContributorRole, Technique};

    fn advisory_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            profile: Profile::Advisory(AdvisoryProfile {
                position_title: "Dean".to_string(),
                experience_years: "18".to_string(),
                domain: "Higher Ed".to_string(),
                lms_features: "Analytics dashboards".to_string(),
            }),
        }
    }

    fn contributor_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            profile: Profile::Contributor(ContributorProfile {
                role: ContributorRole::Educator,
                role_other: None,
                experience_text: "Ten years teaching".to_string(),
                technique: Technique::Gamification,
                technique_other: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_normalizes_email() {
        let directory = MemoryUserDirectory::new();

        let created = directory.create(advisory_user(" Jane@Demo.Com ")).await.unwrap();
        assert_eq!(created.email, "jane@demo.com");
        assert!(!created.password_hash.is_empty());

        let found = directory.find_by_email("JANE@demo.com").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_across_casing() {
        let directory = MemoryUserDirectory::new();

        directory.create(advisory_user("a@b.com")).await.unwrap();
        let err = directory.create(contributor_user("A@B.com")).await.unwrap_err();

        assert!(matches!(err, AuthError::EmailExists));
        assert_eq!(directory.count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_admit_exactly_one() {
        let directory = std::sync::Arc::new(MemoryUserDirectory::new());

        let first = {
            let directory = directory.clone();
            tokio::spawn(async move { directory.create(advisory_user("race@b.com")).await })
        };
        let second = {
            let directory = directory.clone();
            tokio::spawn(async move { directory.create(contributor_user("Race@B.com")).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::EmailExists)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(directory.count().await, 1);
    }

    #[tokio::test]
    async fn test_find_missing_user_is_none() {
        let directory = MemoryUserDirectory::new();
        assert!(directory.find_by_email("nobody@b.com").await.unwrap().is_none());
    }
}
