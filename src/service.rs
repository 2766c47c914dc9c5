//! Authentication Service
//!
//! Orchestrates signup and login: role-aware payload validation, duplicate
//! checks against the user directory, credential hashing, and session token
//! issuance. Holds no per-request state; everything durable lives in the
//! directory and everything session-scoped lives in the token.

use crate::config::AppConfig;
use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::models::{
    normalize_email, AdvisoryProfile, AuthResponse, ContributorProfile, ContributorRole, NewUser,
    Profile, RolePayload, SignupRequest, Technique, User, UserResponse,
};
use crate::password::CredentialHasher;
use crate::token::TokenService;

use std::sync::Arc;

/// Signup/login orchestrator
pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    hasher: CredentialHasher,
    tokens: TokenService,
    config: AppConfig,
}

impl AuthService {
    /// Build the service, constructing the hasher and token signer from the
    /// injected configuration. Configuration problems surface here, before
    /// any request is served.
    pub fn new(directory: Arc<dyn UserDirectory>, config: AppConfig) -> Result<Self, AuthError> {
        let hasher = CredentialHasher::new(&config)?;
        let tokens = TokenService::new(&config)?;

        Ok(Self {
            directory,
            hasher,
            tokens,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ============================================
    // Signup
    // ============================================

    /// Create an account and mint its first session token.
    ///
    /// No write happens unless every validation step and the password hash
    /// succeed; the single insert is the only side effect.
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthResponse, AuthError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        if !has_email_shape(&req.email) {
            return Err(AuthError::Validation(
                "Enter a valid email address".to_string(),
            ));
        }

        if req.password.len() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let profile = sanitize_profile(req.role)?;
        let email = normalize_email(&req.email);

        // Fast path; the directory's uniqueness constraint remains the
        // authority under concurrent signups for the same address.
        if self.directory.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .directory
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                profile,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            role_type = %user.role_type(),
            "User signed up"
        );

        self.issue_session(&user)
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate an email/password pair and mint a session token.
    ///
    /// A missing account and a wrong password produce the same error; no
    /// directory writes happen on either path.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let email = normalize_email(email);
        let user = self
            .directory
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue_session(&user)
    }

    fn issue_session(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let identity = UserResponse::from(user);
        let token = self.tokens.sign(&identity)?;

        Ok(AuthResponse {
            success: true,
            user: identity,
            token,
        })
    }
}

/// Plausible `local@domain` shape; full syntax checking stays at the edge
fn has_email_shape(email: &str) -> bool {
    matches!(
        email.trim().split_once('@'),
        Some((local, domain)) if !local.is_empty() && !domain.is_empty()
    )
}

/// Validate and trim the role-specific profile, keeping only the fields of
/// the matching branch. Free-text overrides are retained only when their
/// `other` selector is chosen.
fn sanitize_profile(payload: RolePayload) -> Result<Profile, AuthError> {
    match payload {
        RolePayload::Contributor { contributor } => {
            let role_other = match contributor.role {
                ContributorRole::Other => Some(required_trimmed(
                    contributor.role_other.as_deref(),
                    "Contributor role (other) is required",
                )?),
                _ => None,
            };

            let experience_text = required_trimmed(
                Some(&contributor.experience_text),
                "Contributor experience is required",
            )?;

            let technique_other = match contributor.technique {
                Technique::Other => Some(required_trimmed(
                    contributor.technique_other.as_deref(),
                    "Contributor technique (other) is required",
                )?),
                _ => None,
            };

            Ok(Profile::Contributor(ContributorProfile {
                role: contributor.role,
                role_other,
                experience_text,
                technique: contributor.technique,
                technique_other,
            }))
        }
        RolePayload::Advisory { advisory } => Ok(Profile::Advisory(AdvisoryProfile {
            position_title: required_trimmed(
                Some(&advisory.position_title),
                "Position title is required",
            )?,
            experience_years: required_trimmed(
                Some(&advisory.experience_years),
                "Experience is required",
            )?,
            domain: required_trimmed(Some(&advisory.domain), "Domain is required")?,
            lms_features: required_trimmed(
                Some(&advisory.lms_features),
                "Feature feedback is required",
            )?,
        })),
    }
}

fn required_trimmed(value: Option<&str>, message: &str) -> Result<String, AuthError> {
    let trimmed = value.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}
