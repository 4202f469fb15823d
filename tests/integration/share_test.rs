//! Share creation, redemption and revocation over HTTP.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use homeshare_entity::AccessLevel;

use crate::helpers::{TestApp, cookie_max_age, cookie_pair};

async fn create_share(app: &TestApp, token: &str, access: &str, hours: i64) -> Value {
    let response = app
        .request(
            "POST",
            "/api/shares",
            Some(json!({
                "folder_name": "Family photos",
                "otp": "123456",
                "access": access,
                "expiration_date": (Utc::now() + Duration::hours(hours)).to_rfc3339(),
            })),
            Some(token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body
}

async fn redeem(app: &TestApp, link: &str, otp: &str, cookie: Option<&str>) -> crate::helpers::TestResponse {
    app.request(
        "POST",
        "/api/shares/redeem",
        Some(json!({"link_url": link, "otp": otp})),
        None,
        cookie,
    )
    .await
}

#[tokio::test]
async fn test_share_round_trip() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = create_share(&app, &admin, "w", 48).await;
    let link = created["link_id"].as_str().unwrap();
    let folder_id = created["folder_id"].as_str().unwrap();

    let redeemed = redeem(&app, link, "123456", None).await;
    assert_eq!(redeemed.status, StatusCode::OK);
    assert_eq!(redeemed.body["folder_id"], folder_id);

    let claims = app.claims(redeemed.body["access_token"].as_str().unwrap());
    assert_eq!(claims.folder_id, folder_id);
    assert_eq!(claims.access, AccessLevel::Write);
    let cookie = redeemed.set_cookie.expect("refresh cookie");
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Expires="));
    let max_age = cookie_max_age(&cookie).expect("Max-Age");
    assert!(max_age <= 48 * 3600);
    assert!(max_age > 47 * 3600);

    let wrong = redeem(&app, link, "654321", None).await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert!(wrong.set_cookie.is_none());

    let again = redeem(&app, link, "123456", None).await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_link_looks_like_wrong_otp() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = create_share(&app, &admin, "r", 1).await;

    let wrong_otp = redeem(&app, created["link_id"].as_str().unwrap(), "000000", None).await;
    let unknown = redeem(&app, &uuid::Uuid::new_v4().to_string(), "123456", None).await;

    assert_eq!(wrong_otp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_otp.body, unknown.body);
}

#[tokio::test]
async fn test_share_token_cannot_create_shares() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = create_share(&app, &admin, "rw", 1).await;
    let redeemed = redeem(&app, created["link_id"].as_str().unwrap(), "123456", None).await;
    let share_token = redeemed.body["access_token"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            "/api/shares",
            Some(json!({
                "folder_name": "escalation",
                "otp": "1",
                "access": "rw",
                "expiration_date": (Utc::now() + Duration::hours(1)).to_rfc3339(),
            })),
            Some(share_token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_past_expiration_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let response = app
        .request(
            "POST",
            "/api/shares",
            Some(json!({
                "folder_name": "late",
                "otp": "1",
                "access": "r",
                "expiration_date": (Utc::now() - Duration::minutes(1)).to_rfc3339(),
            })),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_existing_sufficient_cookie_is_kept() {
    let app = TestApp::new().await;
    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"username": "admin", "password": crate::helpers::ADMIN_PASSWORD})),
            None,
            None,
        )
        .await;
    let admin = login.body["access_token"].as_str().unwrap().to_string();
    let admin_cookie = login.set_cookie.expect("refresh cookie");

    let created = create_share(&app, &admin, "r", 1).await;
    let link = created["link_id"].as_str().unwrap();

    let with_root_cookie = redeem(&app, link, "123456", Some(cookie_pair(&admin_cookie))).await;
    assert_eq!(with_root_cookie.status, StatusCode::OK);
    assert!(with_root_cookie.set_cookie.is_none());

    let with_junk_cookie = redeem(&app, link, "123456", Some("refresh_token=junk")).await;
    assert_eq!(with_junk_cookie.status, StatusCode::OK);
    assert!(with_junk_cookie.set_cookie.is_some());
}

#[tokio::test]
async fn test_revoke() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = create_share(&app, &admin, "r", 1).await;
    let link = created["link_id"].as_str().unwrap();
    let folder = app
        .layout
        .folder_path(created["folder_id"].as_str().unwrap())
        .unwrap();
    assert!(folder.is_dir());

    let revoked = app
        .request("DELETE", &format!("/api/shares/{link}"), None, Some(&admin), None)
        .await;
    assert_eq!(revoked.status, StatusCode::NO_CONTENT);
    assert!(!folder.exists());

    let redeemed = redeem(&app, link, "123456", None).await;
    assert_eq!(redeemed.status, StatusCode::UNAUTHORIZED);
}
