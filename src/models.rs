//! Data Model
//!
//! User records, role-specific profiles, request/response DTOs, and session
//! token claims. Wire names are camelCase to match the public API contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ============================================
// Roles and Profiles
// ============================================

/// Account role discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Contributor,
    Advisory,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Contributor => "contributor",
            RoleType::Advisory => "advisory",
        }
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a contributor does day to day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorRole {
    Educator,
    Researcher,
    Developer,
    Designer,
    Student,
    Other,
}

/// Teaching technique a contributor wants to bring to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    SpacedRepetition,
    ActiveRecall,
    Gamification,
    ProjectBased,
    PeerLearning,
    Other,
}

/// Contributor-specific profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorProfile {
    pub role: ContributorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_other: Option<String>,
    pub experience_text: String,
    pub technique: Technique,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique_other: Option<String>,
}

/// Advisory-board-specific profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryProfile {
    pub position_title: String,
    pub experience_years: String,
    pub domain: String,
    pub lms_features: String,
}

/// Role-specific profile: exactly one variant exists per user, and the
/// role discriminant is derived from it rather than stored alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Contributor(ContributorProfile),
    Advisory(AdvisoryProfile),
}

impl Profile {
    pub fn role_type(&self) -> RoleType {
        match self {
            Profile::Contributor(_) => RoleType::Contributor,
            Profile::Advisory(_) => RoleType::Advisory,
        }
    }
}

// ============================================
// User Entity
// ============================================

/// User identity record
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_type(&self) -> RoleType {
        self.profile.role_type()
    }
}

/// Fields for a directory insert; id and timestamps are assigned on write
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// Canonical form of an email address: trimmed and lower-cased. Applied
/// before every directory lookup and write so differently-cased
/// submissions of the same address collide deterministically.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============================================
// Request DTOs
// ============================================

/// Role payload of a signup request. The `roleType` field selects the
/// variant, and the matching profile object must be present; anything else
/// fails at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "roleType", rename_all = "lowercase")]
pub enum RolePayload {
    Contributor { contributor: ContributorProfile },
    Advisory { advisory: AdvisoryProfile },
}

/// Signup request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(flatten)]
    pub role: RolePayload,

    /// Signup sessions are remembered unless the caller opts out.
    #[serde(default)]
    pub remember: Option<bool>,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub remember: Option<bool>,
}

/// Query parameters for the legacy GET login variant
#[derive(Debug, Clone, Deserialize)]
pub struct LoginQuery {
    pub email: Option<String>,
    pub password: Option<String>,
    pub remember: Option<bool>,
}

// ============================================
// Response DTOs
// ============================================

/// Identity snapshot returned to callers and embedded in tokens.
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role_type: RoleType,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role_type: user.role_type(),
        }
    }
}

/// Successful signup/login response
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub token: String,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// Session Token Claims
// ============================================

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User email
    pub email: String,
    /// User display name
    pub name: String,
    /// Account role
    #[serde(rename = "roleType")]
    pub role_type: RoleType,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}
