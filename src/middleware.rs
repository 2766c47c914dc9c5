//! Middleware
//!
//! Session token verification for protected routes. Verified claims are
//! stored in request extensions for downstream extractors.

use crate::error::AuthError;
use crate::extractors::extract_token;
use crate::handlers::AppState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Require a verified session token.
///
/// Absence of a token and a failed verification are the same outcome:
/// unauthenticated.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(req.headers()).ok_or(AuthError::InvalidToken)?;
    let claims = state
        .auth
        .tokens()
        .verify(&token)
        .ok_or(AuthError::InvalidToken)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
