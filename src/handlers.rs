//! HTTP Handlers
//!
//! REST endpoints for signup, login, the authenticated identity snapshot,
//! and the waitlist. Session tokens are returned in the body and attached
//! as an http-only cookie.

use crate::config::AppConfig;
use crate::error::AuthError;
use crate::extractors::{AuthUser, TOKEN_COOKIE};
use crate::middleware;
use crate::models::{LoginQuery, LoginRequest, MessageResponse, SignupRequest};
use crate::service::AuthService;
use crate::waitlist::{ContributeRequest, SubscribeRequest, WaitlistService};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub waitlist: Arc<WaitlistService>,
}

// ============================================
// Route Builder
// ============================================

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login).get(login_query))
        .route("/waitlist/subscribe", post(subscribe))
        .route("/waitlist/contribute", post(contribute));

    let protected = Router::new().route("/auth/me", get(me)).route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth),
    );

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the session cookie. Max-Age is applied only for remembered
/// sessions; otherwise the cookie is scoped to the browser session while
/// the token still carries its own encoded expiry.
fn session_cookie(config: &AppConfig, token: &str, remember: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(TOKEN_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(config.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if remember {
        cookie.set_max_age(time::Duration::seconds(config.session_ttl));
    }
    cookie
}

// ============================================
// Signup
// ============================================

/// POST /auth/signup
///
/// Create an account and start a session. The body goes through
/// `serde_json::from_value` so every malformed-payload shape maps to a 400.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AuthError> {
    let req: SignupRequest = serde_json::from_value(body)
        .map_err(|err| AuthError::Validation(format!("Invalid signup payload: {err}")))?;
    req.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let remember = req.remember.unwrap_or(true);
    let response = state.auth.signup(req).await?;

    let jar =
        CookieJar::new().add(session_cookie(state.auth.config(), &response.token, remember));

    Ok((StatusCode::CREATED, jar, Json(response)).into_response())
}

// ============================================
// Login
// ============================================

/// POST /auth/login
///
/// Authenticate and start a session; cookie persistence follows the
/// `remember` flag.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AuthError> {
    let req: LoginRequest = serde_json::from_value(body)
        .map_err(|err| AuthError::Validation(format!("Invalid login payload: {err}")))?;
    req.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    let response = state.auth.login(&req.email, &req.password).await?;
    let remember = req.remember.unwrap_or(false);

    let jar =
        CookieJar::new().add(session_cookie(state.auth.config(), &response.token, remember));

    Ok((jar, Json(response)).into_response())
}

/// GET /auth/login
///
/// Legacy query-parameter variant. Credentials in query strings end up in
/// intermediary logs, so this answers 405 unless explicitly enabled.
pub async fn login_query(
    State(state): State<AppState>,
    Query(params): Query<LoginQuery>,
) -> Result<Response, AuthError> {
    if !state.auth.config().allow_query_login {
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({
                "success": false,
                "error": "method_not_allowed",
                "message": "Use POST /auth/login"
            })),
        )
            .into_response());
    }

    tracing::warn!("Query-parameter login used; credentials may appear in intermediary logs");

    let email = params.email.unwrap_or_default();
    let password = params.password.unwrap_or_default();
    let response = state.auth.login(&email, &password).await?;
    let remember = params.remember.unwrap_or(false);

    let jar =
        CookieJar::new().add(session_cookie(state.auth.config(), &response.token, remember));

    Ok((jar, Json(response)).into_response())
}

// ============================================
// Identity
// ============================================

/// GET /auth/me
///
/// Identity snapshot for the verified caller
pub async fn me(user: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "roleType": user.role_type
        }
    }))
}

// ============================================
// Waitlist
// ============================================

/// POST /waitlist/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AuthError> {
    let req: SubscribeRequest = serde_json::from_value(body)
        .map_err(|err| AuthError::Validation(format!("Invalid subscribe payload: {err}")))?;
    req.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    state.waitlist.subscribe(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "Successfully subscribed! Check your email for confirmation.",
    ))
    .into_response())
}

/// POST /waitlist/contribute
pub async fn contribute(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AuthError> {
    let req: ContributeRequest = serde_json::from_value(body)
        .map_err(|err| AuthError::Validation(format!("Invalid contribute payload: {err}")))?;
    req.validate()
        .map_err(|err| AuthError::Validation(err.to_string()))?;

    state.waitlist.contribute(&req.name, &req.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Thanks for offering to contribute. We'll be in touch soon.",
        )),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::mock::MemoryUserDirectory;
    use crate::email::EmailClient;
    use crate::waitlist::mock::MemoryWaitlistStore;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(allow_query_login: bool) -> AppState {
        let mut config = AppConfig::for_tests();
        config.allow_query_login = allow_query_login;

        let directory = Arc::new(MemoryUserDirectory::new());
        let auth = Arc::new(AuthService::new(directory, config.clone()).unwrap());
        let email = Arc::new(EmailClient::new(&config));
        let waitlist = Arc::new(WaitlistService::new(
            Arc::new(MemoryWaitlistStore::new()),
            email,
        ));

        AppState { auth, waitlist }
    }

    fn jane_signup() -> serde_json::Value {
        serde_json::json!({
            "name": "Jane",
            "email": "Jane@Demo.com",
            "password": "CorrectHorseBattery1",
            "roleType": "advisory",
            "advisory": {
                "positionTitle": "Dean",
                "experienceYears": "18",
                "domain": "Higher Ed",
                "lmsFeatures": "Analytics dashboards and SIS integrations"
            }
        })
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_with_headers(app: &Router, uri: &str, headers: &[(&str, String)]) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        app.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Set-Cookie header")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_signup_creates_account_and_sets_remembered_cookie() {
        let app = create_router(test_state(false));

        let response = post_json(&app, "/auth/signup", jane_signup()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        // Signup sessions are remembered by default
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "jane@demo.com");
        assert_eq!(body["user"]["roleType"], "advisory");
        assert!(body["user"].get("passwordHash").is_none());
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_token_claims_match_identity() {
        let state = test_state(false);
        let app = create_router(state.clone());

        let response = post_json(&app, "/auth/signup", jane_signup()).await;
        let body = body_json(response).await;

        let claims = state
            .auth
            .tokens()
            .verify(body["token"].as_str().unwrap())
            .expect("signup token should verify");
        assert_eq!(claims.email, "jane@demo.com");
        assert_eq!(claims.name, "Jane");
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let app = create_router(test_state(false));

        let first = post_json(&app, "/auth/signup", jane_signup()).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = post_json(&app, "/auth/signup", jane_signup()).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(second).await["error"], "email_exists");
    }

    #[tokio::test]
    async fn test_signup_with_missing_role_type_is_a_bad_request() {
        let app = create_router(test_state(false));

        let mut payload = jane_signup();
        payload.as_object_mut().unwrap().remove("roleType");

        let response = post_json(&app, "/auth/signup", payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_with_short_password_is_a_bad_request() {
        let app = create_router(test_state(false));

        let mut payload = jane_signup();
        payload["password"] = serde_json::json!("short");

        let response = post_json(&app, "/auth/signup", payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_opting_out_of_remember_scopes_cookie_to_session() {
        let app = create_router(test_state(false));

        let mut payload = jane_signup();
        payload["remember"] = serde_json::json!(false);

        let response = post_json(&app, "/auth/signup", payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(!set_cookie(&response).contains("Max-Age"));
    }

    #[tokio::test]
    async fn test_login_round_trip_with_remember() {
        let state = test_state(false);
        let app = create_router(state.clone());
        post_json(&app, "/auth/signup", jane_signup()).await;

        let response = post_json(
            &app,
            "/auth/login",
            serde_json::json!({
                "email": "jane@demo.com",
                "password": "CorrectHorseBattery1",
                "remember": true
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).contains("Max-Age=86400"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(state
            .auth
            .tokens()
            .verify(body["token"].as_str().unwrap())
            .is_some());
    }

    #[tokio::test]
    async fn test_login_without_remember_scopes_cookie_to_session() {
        let app = create_router(test_state(false));
        post_json(&app, "/auth/signup", jane_signup()).await;

        let response = post_json(
            &app,
            "/auth/login",
            serde_json::json!({
                "email": "jane@demo.com",
                "password": "CorrectHorseBattery1"
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = set_cookie(&response);
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Max-Age"));
    }

    #[tokio::test]
    async fn test_failed_logins_are_indistinguishable() {
        let app = create_router(test_state(false));
        post_json(&app, "/auth/signup", jane_signup()).await;

        let wrong_password = post_json(
            &app,
            "/auth/login",
            serde_json::json!({"email": "jane@demo.com", "password": "wrong-password"}),
        )
        .await;
        let unknown_email = post_json(
            &app,
            "/auth/login",
            serde_json::json!({"email": "nobody@demo.com", "password": "CorrectHorseBattery1"}),
        )
        .await;

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

        let first = body_json(wrong_password).await;
        let second = body_json(unknown_email).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_login_with_missing_fields_is_a_bad_request() {
        let app = create_router(test_state(false));

        let response = post_json(
            &app,
            "/auth/login",
            serde_json::json!({"email": "jane@demo.com"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_login_is_method_not_allowed_by_default() {
        let app = create_router(test_state(false));

        let response = get_with_headers(
            &app,
            "/auth/login?email=jane@demo.com&password=CorrectHorseBattery1",
            &[],
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_query_login_works_when_explicitly_enabled() {
        let app = create_router(test_state(true));
        post_json(&app, "/auth/signup", jane_signup()).await;

        let response = get_with_headers(
            &app,
            "/auth/login?email=jane@demo.com&password=CorrectHorseBattery1&remember=true",
            &[],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookie(&response).contains("Max-Age=86400"));
    }

    #[tokio::test]
    async fn test_me_accepts_cookie_and_bearer_tokens() {
        let app = create_router(test_state(false));

        let signup = post_json(&app, "/auth/signup", jane_signup()).await;
        let token = body_json(signup).await["token"].as_str().unwrap().to_string();

        let via_cookie =
            get_with_headers(&app, "/auth/me", &[("cookie", format!("token={token}"))]).await;
        assert_eq!(via_cookie.status(), StatusCode::OK);
        assert_eq!(body_json(via_cookie).await["user"]["name"], "Jane");

        let via_bearer = get_with_headers(
            &app,
            "/auth/me",
            &[("authorization", format!("Bearer {token}"))],
        )
        .await;
        assert_eq!(via_bearer.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_rejects_missing_and_invalid_tokens() {
        let app = create_router(test_state(false));

        let missing = get_with_headers(&app, "/auth/me", &[]).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let garbage = get_with_headers(
            &app,
            "/auth/me",
            &[("cookie", "token=not.a.token".to_string())],
        )
        .await;
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_waitlist_subscribe_and_duplicate() {
        let app = create_router(test_state(false));

        let first = post_json(
            &app,
            "/waitlist/subscribe",
            serde_json::json!({"email": "fan@example.com"}),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);

        let repeat = post_json(
            &app,
            "/waitlist/subscribe",
            serde_json::json!({"email": "Fan@Example.com"}),
        )
        .await;
        assert_eq!(repeat.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_waitlist_contribute_created() {
        let app = create_router(test_state(false));

        let response = post_json(
            &app,
            "/waitlist/contribute",
            serde_json::json!({"name": "Ada", "email": "ada@example.com"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_waitlist_rejects_bad_email() {
        let app = create_router(test_state(false));

        let response = post_json(
            &app,
            "/waitlist/subscribe",
            serde_json::json!({"email": "not-an-email"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
