use super::*;
use crate::api::transport::ApiRequest;
use crate::api::types::{ApiError, Role};
use crate::routes::app;
use crate::state::test_helpers::{
    ScriptedTransport, StaticFeed, call, request, sample_user, set_cookie, test_config, test_state,
};
use serde_json::json;
use std::sync::Arc;

fn backend(req: &ApiRequest) -> Result<Value, ApiError> {
    match (req.method.as_str(), req.path().as_str()) {
        ("POST", "/auth/login") => {
            let body = req.body.clone().unwrap_or(Value::Null);
            if body["password"] == "secret" {
                Ok(json!({"token": "tok-1"}))
            } else {
                Err(ApiError::Status { status: 401, message: "Invalid credentials".into() })
            }
        }
        ("GET", "/auth/profile") => Ok(serde_json::to_value(sample_user(7, Role::Admin)).unwrap()),
        ("PUT", "/auth/profile") => {
            let mut user = sample_user(7, Role::Admin);
            user.username = req.body.as_ref().unwrap()["username"].as_str().unwrap().to_owned();
            Ok(serde_json::to_value(user).unwrap())
        }
        ("PUT", "/auth/change-password") => {
            if req.body.as_ref().unwrap()["old_password"] == "secret" {
                Ok(json!({"message": "Password changed"}))
            } else {
                Err(ApiError::Status { status: 400, message: "Old password is incorrect".into() })
            }
        }
        ("POST", "/auth/register") => Ok(json!({"id": 42, "username": "new"})),
        (method, path) => panic!("unexpected {method} {path}"),
    }
}

fn online_app() -> (AppState, axum::Router) {
    let state = test_state(ScriptedTransport::new(backend), StaticFeed::failing());
    (state.clone(), app(state))
}

fn login_body(password: &str) -> Option<Value> {
    Some(json!({"email": "admin@example.com", "password": password}))
}

// =============================================================================
// login / session
// =============================================================================

#[tokio::test]
async fn login_sets_marker_and_reports_session() {
    let (state, app) = online_app();
    let (status, headers, body) = call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["isGuest"], false);
    assert_eq!(body["user"]["id"], 7);
    assert!(body.get("token").is_none());

    let cookie = set_cookie(&headers, "isAuthenticated").unwrap();
    let marker = cookie.trim_start_matches("isAuthenticated=");
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    assert!(state.session.accepts_marker(&state.config.marker_key, marker, now));
    assert!(!marker.contains("tok-1"));
}

#[tokio::test]
async fn bad_credentials_are_401_without_marker() {
    let (state, app) = online_app();
    let (status, headers, body) = call(&app, request("POST", "/api/auth/login", None, login_body("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
    assert!(set_cookie(&headers, "isAuthenticated").is_none());
    assert!(!state.session.is_authenticated());
}

#[tokio::test]
async fn session_endpoint_reflects_state() {
    let (_, app) = online_app();
    let (_, _, body) = call(&app, request("GET", "/api/auth/session", None, None)).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["user"], Value::Null);

    call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    let (_, _, body) = call(&app, request("GET", "/api/auth/session", None, None)).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["username"], "user7");
}

#[tokio::test]
async fn guest_login_disabled_is_403() {
    let mut config = test_config();
    config.guest_login_enabled = false;
    let state = AppState::new(
        config,
        ScriptedTransport::failing(),
        StaticFeed::failing(),
        Arc::new(crate::session::storage::MemoryTokenStore::new()),
    );
    let app = app(state);
    let (status, _, body) = call(&app, request("POST", "/api/auth/guest", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E_GUEST_LOGIN_DISABLED");
}

// =============================================================================
// profile / password / register
// =============================================================================

#[tokio::test]
async fn profile_routes_require_session() {
    let (_, app) = online_app();
    let (status, _, _) = call(&app, request("GET", "/api/auth/profile", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = call(
        &app,
        request("PUT", "/api/auth/profile", None, Some(json!({"username": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = call(
        &app,
        request(
            "PUT",
            "/api/auth/change-password",
            None,
            Some(json!({"old_password": "a", "new_password": "b"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_refresh_reads_through_session() {
    let (state, app) = online_app();
    call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    let (status, _, body) = call(&app, request("GET", "/api/auth/profile", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert!(state.session.is_authenticated());
}

#[tokio::test]
async fn rejected_profile_refresh_signs_session_out() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let revoked = Arc::new(AtomicBool::new(false));
    let flag = revoked.clone();
    let transport = ScriptedTransport::new(move |req| {
        if req.path() == "/auth/profile" && flag.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 401, message: "Invalid token".into() });
        }
        backend(req)
    });
    let state = test_state(transport, StaticFeed::failing());
    let app = app(state.clone());

    let (_, headers, _) = call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    let cookie = set_cookie(&headers, "isAuthenticated").unwrap();
    revoked.store(true, Ordering::SeqCst);

    let (status, _, body) = call(&app, request("GET", "/api/auth/profile", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E_TOKEN_REJECTED");
    assert!(!state.session.is_authenticated());

    let (status, headers, _) = call(&app, request("GET", "/dashboard", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[axum::http::header::LOCATION].to_str().unwrap(), "/login");
}

#[tokio::test]
async fn guest_profile_is_served_locally_while_backend_is_down() {
    let transport = ScriptedTransport::failing();
    let state = test_state(transport.clone(), StaticFeed::failing());
    let app = app(state.clone());
    call(&app, request("POST", "/api/auth/guest", None, None)).await;

    let (status, _, body) = call(&app, request("GET", "/api/auth/profile", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "Guest Admin");
    assert_eq!(body["role"], "admin");
    assert!(transport.calls().is_empty());
    assert!(state.session.snapshot().is_guest);
}

#[tokio::test]
async fn update_profile_returns_updated_user() {
    let (state, app) = online_app();
    call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    let (status, _, body) = call(
        &app,
        request("PUT", "/api/auth/profile", None, Some(json!({"username": "renamed"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "renamed");
    assert_eq!(state.session.snapshot().user.unwrap().username, "renamed");
}

#[tokio::test]
async fn change_password_passes_backend_verdict_through() {
    let (_, app) = online_app();
    call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;

    let ok = Some(json!({"old_password": "secret", "new_password": "next"}));
    let (status, _, _) = call(&app, request("PUT", "/api/auth/change-password", None, ok)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let bad = Some(json!({"old_password": "nope", "new_password": "next"}));
    let (status, _, body) = call(&app, request("PUT", "/api/auth/change-password", None, bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Old password is incorrect");
}

#[tokio::test]
async fn register_is_gated_and_forwarded() {
    let (_, app) = online_app();
    let input = Some(json!({"username": "new", "email": "new@example.com", "password": "pw"}));
    let (status, _, _) = call(&app, request("POST", "/api/auth/register", None, input.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    call(&app, request("POST", "/api/auth/login", None, login_body("secret"))).await;
    let (status, _, body) = call(&app, request("POST", "/api/auth/register", None, input)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 42);
}
