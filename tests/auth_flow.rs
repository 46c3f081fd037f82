use serde_json::json;
use warp::http::StatusCode;
mod common;
use common::{PASSWORD, TestHarness, error_code};

#[tokio::test]
async fn login_returns_a_token_pair_and_the_user() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;

    let session = harness.login("ana@example.com").await;

    assert_eq!(session["user"]["email"], json!("ana@example.com"));
    assert!(session["accessToken"].as_str().is_some());
    assert!(session["refreshToken"].as_str().is_some());
    assert_ne!(session["accessToken"], session["refreshToken"]);
    assert!(session["accessTokenExpiresAt"].as_str().is_some());
    assert!(session["refreshTokenExpiresAt"].as_str().is_some());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;

    for body in [
        json!({ "email": "ana@example.com", "password": "nope" }),
        json!({ "email": "nobody@example.com", "password": PASSWORD }),
    ] {
        let (status, response) = harness
            .request("POST", "/api/v1/auth/login", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&response), "AUTH_001");
    }
}

#[tokio::test]
async fn refresh_rotates_and_rejects_the_previous_token() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;
    let session = harness.login("ana@example.com").await;
    let first = session["refreshToken"].clone();

    let (status, rotated) = harness
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": first })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{rotated}");
    assert_ne!(rotated["data"]["refreshToken"], first);
    assert_ne!(rotated["data"]["accessToken"], session["accessToken"]);

    let (status, replay) = harness
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": first })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&replay), "AUTH_009");
}

#[tokio::test]
async fn refresh_distinguishes_missing_and_invalid_tokens() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;
    let session = harness.login("ana@example.com").await;

    let (status, missing) = harness
        .request("POST", "/api/v1/auth/refresh-token", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&missing), "AUTH_007");

    let (_, empty) = harness
        .request("POST", "/api/v1/auth/refresh-token", None, Some(json!({})))
        .await;
    assert_eq!(error_code(&empty), "AUTH_007");

    // An access token is not a refresh token.
    let (status, wrong_kind) = harness
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": session["accessToken"] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&wrong_kind), "AUTH_008");
}

#[tokio::test]
async fn refresh_token_is_not_accepted_as_bearer() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;
    let session = harness.login("ana@example.com").await;
    let refresh = session["refreshToken"].as_str().unwrap();

    let (status, body) = harness.get("/api/v1/squads", refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_003");
}

#[tokio::test]
async fn logout_revokes_the_refresh_token() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;
    let session = harness.login("ana@example.com").await;
    let access = session["accessToken"].as_str().unwrap();

    let (status, body) = harness
        .request("POST", "/api/v1/auth/logout", Some(access), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], json!(true));

    let (status, body) = harness
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            None,
            Some(json!({ "refreshToken": session["refreshToken"] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_009");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_header() {
    let harness = TestHarness::new().await;

    let (status, body) = harness.request("GET", "/api/v1/squads", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_002");

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/employees")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .reply(&squadhours::api::routes(harness.server.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(error_code(&body), "AUTH_002");

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/squads")
        .header(
            "authorization",
            warp::http::HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        )
        .reply(&squadhours::api::routes(harness.server.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(error_code(&body), "AUTH_002");

    let (status, body) = harness.get("/api/v1/squads", "not.a.jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_003");
}

#[tokio::test]
async fn authentication_runs_before_body_validation() {
    let harness = TestHarness::new().await;
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/squads")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&squadhours::api::routes(harness.server.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_is_single_use() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;

    let (status, _) = harness
        .request(
            "POST",
            "/api/v1/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = harness.notifier.last_token_for("ana@example.com").unwrap();
    assert_eq!(token.len(), 64);

    let reset = json!({ "token": token, "newPassword": "brand new secret" });
    let (status, body) = harness
        .request("POST", "/api/v1/auth/reset-password", None, Some(reset.clone()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = harness
        .request("POST", "/api/v1/auth/reset-password", None, Some(reset))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "AUTH_005");

    let (status, _) = harness
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "brand new secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn forgot_password_is_silent_for_unknown_emails() {
    let harness = TestHarness::new().await;

    let (status, body) = harness
        .request(
            "POST",
            "/api/v1/auth/forgot-password",
            None,
            Some(json!({ "email": "ghost@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(harness.notifier.last_token_for("ghost@example.com").is_none());
}

#[tokio::test]
async fn reset_rejects_short_passwords() {
    let harness = TestHarness::new().await;
    harness.create_user("ana@example.com").await;
    harness
        .request(
            "POST",
            "/api/v1/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
    let token = harness.notifier.last_token_for("ana@example.com").unwrap();

    let (status, body) = harness
        .request(
            "POST",
            "/api/v1/auth/reset-password",
            None,
            Some(json!({ "token": token, "newPassword": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_001");
}
