//! Token Service
//!
//! Signs and verifies stateless session tokens (HS256 JWTs). The payload is
//! the caller's identity snapshot plus issued-at/expiry; all session state
//! lives in the token itself.

use crate::config::AppConfig;
use crate::error::AuthError;
use crate::models::{AuthTokenClaims, UserResponse};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Session token signer/verifier
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    session_ttl: i64,
}

impl TokenService {
    /// Build a token service from configuration.
    ///
    /// The signing secret must be configured; an empty secret is a fatal
    /// configuration error, never a silent default.
    pub fn new(config: &AppConfig) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT secret is not set".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            session_ttl: config.session_ttl,
        })
    }

    /// Configured session lifetime in seconds
    pub fn session_ttl(&self) -> i64 {
        self.session_ttl
    }

    /// Sign a session token for an identity snapshot with the default TTL
    pub fn sign(&self, identity: &UserResponse) -> Result<String, AuthError> {
        self.sign_with_ttl(identity, self.session_ttl)
    }

    /// Sign a session token with an explicit TTL in seconds
    pub fn sign_with_ttl(
        &self,
        identity: &UserResponse,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_seconds);

        let claims = AuthTokenClaims {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role_type: identity.role_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Config(format!("Token signing failed: {err}")))?;
        Ok(token)
    }

    /// Verify a session token.
    ///
    /// Returns the decoded claims only when the signature is valid and the
    /// token has not expired; any structural, signature, algorithm, or
    /// expiry failure is `None` — callers treat that as unauthenticated,
    /// not as an exceptional condition.
    pub fn verify(&self, token: &str) -> Option<AuthTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        match decode::<AuthTokenClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!("Session token rejected: {:?}", err);
                None
            }
        }
    }
}
