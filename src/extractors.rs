//! Extractors
//!
//! Axum extractors for authenticated identity. The session token is pulled
//! from the cookie, the `Authorization: Bearer` header, or the
//! `x-access-token` header, in that precedence, and verified against the
//! injected token service — never against ambient environment state.

use crate::error::AuthError;
use crate::handlers::AppState;
use crate::models::{AuthTokenClaims, RoleType};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated identity extracted from verified token claims
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role_type: RoleType,
}

impl AuthUser {
    pub fn from_claims(claims: &AuthTokenClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            name: claims.name.clone(),
            role_type: claims.role_type,
        }
    }
}

/// Pull the raw session token out of a request's headers.
///
/// Precedence: cookie, then `Authorization: Bearer`, then `x-access-token`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if value.len() > 7 && value[..7].eq_ignore_ascii_case("bearer ") {
            let token = value[7..].trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get("x-access-token")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Claims may already be verified by the middleware
        if let Some(claims) = parts.extensions.get::<AuthTokenClaims>() {
            return Ok(AuthUser::from_claims(claims));
        }

        let app = AppState::from_ref(state);
        let token = extract_token(&parts.headers).ok_or(AuthError::InvalidToken)?;
        let claims = app
            .auth
            .tokens()
            .verify(&token)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser::from_claims(&claims))
    }
}
