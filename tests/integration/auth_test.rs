//! Login, refresh, logout and bearer handling.

use axum::http::StatusCode;
use serde_json::json;

use homeshare_entity::AccessLevel;

use crate::helpers::{ADMIN_PASSWORD, TestApp, cookie_max_age, cookie_pair};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_login_sets_refresh_cookie() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["folder_id"], "/");
    assert_eq!(response.body["access"], "rw");

    let cookie = response.set_cookie.expect("refresh cookie");
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Expires="));
    let max_age = cookie_max_age(&cookie).expect("Max-Age");
    assert!((720 * 3600 - 5..=720 * 3600).contains(&max_age));

    let claims = app.claims(response.body["access_token"].as_str().unwrap());
    assert_eq!(claims.access, AccessLevel::ReadWrite);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    for (username, password) in [("admin", "wrong"), ("ghost", ADMIN_PASSWORD)] {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({"username": username, "password": password})),
                None,
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.set_cookie.is_none());
    }
}

#[tokio::test]
async fn test_empty_credentials_fail_validation() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"username": "", "password": ""})),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_refresh_uses_cookie() {
    let app = TestApp::new().await;
    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
            None,
            None,
        )
        .await;
    let set_cookie = login.set_cookie.expect("refresh cookie");

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            None,
            Some(cookie_pair(&set_cookie)),
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let claims = app.claims(refreshed.body["access_token"].as_str().unwrap());
    assert_eq!(claims.folder_id, "/");

    let missing = app.request("POST", "/api/auth/refresh", None, None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            None,
            None,
            Some("refresh_token=abc"),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie.expect("removal cookie");
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_bearer_is_required() {
    let app = TestApp::new().await;

    let missing = app
        .request("GET", "/api/folders/root/files", None, None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/folders/root/files", None, Some("not.a.jwt"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}
