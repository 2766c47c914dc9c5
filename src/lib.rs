//! Aedura Signup & Session API
//!
//! Backend for the Aedura early-access program:
//! - Contributor and advisory-board signup with role-specific profiles
//! - Login with Argon2id password verification
//! - Stateless JWT session tokens delivered in the body and as an
//!   http-only cookie
//! - Pre-launch waitlist capture with best-effort email notifications
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables once, at startup:
//! - `JWT_SECRET` - Secret key for signing session tokens (required, min 32 chars)
//! - `DATABASE_URL` - PostgreSQL connection string (required)
//! - `SESSION_TTL` - Session token lifetime in seconds (default: 86400)
//! - `JWT_ISSUER` / `JWT_AUDIENCE` - Token issuer/audience claims
//! - `ARGON2_MEMORY_COST` / `ARGON2_TIME_COST` / `ARGON2_PARALLELISM` - Hashing cost
//! - `APP_ENV` - `production` marks the session cookie `Secure`
//! - `ALLOW_QUERY_LOGIN` - Enables the legacy GET login variant (test-only)
//! - `RESEND_API_KEY` / `EMAIL_FROM` - Waitlist notification email delivery
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0:3000)

pub mod config;
pub mod directory;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;
pub mod waitlist;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use handlers::{create_router, AppState};
pub use models::*;
pub use service::AuthService;
pub use waitlist::WaitlistService;
