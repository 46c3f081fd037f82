use serde_json::json;
use squadhours::application_port::ConnectionState;
use warp::http::StatusCode;
mod common;
use common::TestHarness;

async fn create(harness: &TestHarness, token: &str, path: &str, body: serde_json::Value) -> String {
    let (status, body) = harness.post(path, token, body).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let harness = TestHarness::new().await;
    let token = harness.access_token().await;
    create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;

    let (_, first) = harness.get("/api/v1/squads", &token).await;
    assert!(first.get("cached").is_none());
    assert!(harness.server.cache.get("squads:all").await.is_some());

    let (_, second) = harness.get("/api/v1/squads", &token).await;
    assert_eq!(second["cached"], json!(true));
    assert_eq!(second["data"], first["data"]);
}

#[tokio::test]
async fn writes_invalidate_dependent_listings() {
    let harness = TestHarness::new().await;
    let token = harness.access_token().await;
    let squad_id = create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;

    harness.get("/api/v1/squads", &token).await;
    harness.get(&format!("/api/v1/squads/{squad_id}"), &token).await;
    harness.get("/api/v1/reports/dashboard", &token).await;
    assert!(harness.server.cache.get(&format!("squad:{squad_id}")).await.is_some());

    create(
        &harness,
        &token,
        "/api/v1/employees",
        json!({ "name": "Ana", "estimatedHours": 8, "squadId": squad_id }),
    )
    .await;

    assert!(harness.server.cache.get("squads:all").await.is_none());
    assert!(harness.server.cache.get(&format!("squad:{squad_id}")).await.is_none());
    assert!(harness.server.cache.get("dashboard:stats").await.is_none());

    // The embedded member list is fresh rather than a stale hit.
    let (_, body) = harness.get(&format!("/api/v1/squads/{squad_id}"), &token).await;
    assert!(body.get("cached").is_none());
    assert_eq!(body["data"]["employees"][0]["name"], json!("Ana"));

    let (_, body) = harness.get("/api/v1/reports/dashboard", &token).await;
    assert_eq!(body["data"]["totalEmployees"], json!(1));
}

#[tokio::test]
async fn report_writes_leave_entity_caches_alone() {
    let harness = TestHarness::new().await;
    let token = harness.access_token().await;
    let squad_id = create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;
    let employee_id = create(
        &harness,
        &token,
        "/api/v1/employees",
        json!({ "name": "Ana", "estimatedHours": 8, "squadId": squad_id }),
    )
    .await;
    harness.get("/api/v1/squads", &token).await;
    harness.get("/api/v1/reports", &token).await;

    create(
        &harness,
        &token,
        "/api/v1/reports",
        json!({ "description": "review", "employeeId": employee_id, "spentHours": 2 }),
    )
    .await;

    assert!(harness.server.cache.get("squads:all").await.is_some());
    assert!(harness.server.cache.get("reports:all").await.is_none());
    let (_, body) = harness.get("/api/v1/reports", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["employee"]["squad"]["name"], json!("Core"));
}

#[tokio::test]
async fn misshapen_cache_documents_are_reloaded() {
    let harness = TestHarness::new().await;
    let token = harness.access_token().await;
    create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;
    assert!(
        harness
            .server
            .cache
            .set("squads:all", &json!({ "unexpected": true }), 300)
            .await
    );

    let (status, body) = harness.get("/api/v1/squads", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("cached").is_none());
    assert_eq!(body["data"][0]["name"], json!("Core"));
}

#[tokio::test]
async fn concurrent_misses_agree_with_the_cached_value() {
    let harness = TestHarness::new().await;
    let token = harness.access_token().await;
    let squad_id = create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;
    let employee_id = create(
        &harness,
        &token,
        "/api/v1/employees",
        json!({ "name": "Ana", "estimatedHours": 8, "squadId": squad_id }),
    )
    .await;
    create(
        &harness,
        &token,
        "/api/v1/reports",
        json!({ "description": "review", "employeeId": employee_id, "spentHours": 5 }),
    )
    .await;

    let today = chrono::Utc::now().date_naive();
    let path = format!(
        "/api/v1/reports/squad/{squad_id}/total-hours?startDate={today}&endDate={today}"
    );
    let ((a_status, a), (b_status, b)) =
        tokio::join!(harness.get(&path, &token), harness.get(&path, &token));
    assert_eq!(a_status, StatusCode::OK);
    assert_eq!(b_status, StatusCode::OK);
    assert_eq!(a["data"], b["data"]);

    let key = format!("reports:squad:{squad_id}:total-hours:{today}:{today}");
    let cached = harness.server.cache.get(&key).await.unwrap();
    assert_eq!(cached, a["data"]);
}

#[tokio::test]
async fn service_keeps_answering_without_a_cache() {
    let harness = TestHarness::without_cache().await;
    assert_eq!(harness.server.cache.state(), ConnectionState::Disconnected);
    let token = harness.access_token().await;

    create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;
    for _ in 0..2 {
        let (status, body) = harness.get("/api/v1/squads", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("cached").is_none());
        assert_eq!(body["data"][0]["name"], json!("Core"));
    }
    assert!(harness.cache_store.is_empty());

    let (_, health) = harness.request("GET", "/health", None, None).await;
    assert_eq!(health["cache"], json!("disconnected"));
}

#[tokio::test]
async fn cache_is_used_again_after_reconnecting() {
    let harness = TestHarness::without_cache().await;
    let token = harness.access_token().await;
    create(&harness, &token, "/api/v1/squads", json!({ "name": "Core" })).await;

    harness.cache_store.set_available(true);
    assert!(harness.server.cache.connect().await);

    harness.get("/api/v1/squads", &token).await;
    let (_, body) = harness.get("/api/v1/squads", &token).await;
    assert_eq!(body["cached"], json!(true));
}
