//! User registration tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use common::TestContext;

/// Test registration returns a token that authenticates.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_and_me() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/users/register")
        .json(&json!({ "name": "Avery" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    let user_id: uuid::Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let me: serde_json::Value = response.json();
    assert_eq!(me["user_id"], user_id.to_string());
    assert_eq!(me["name"], "Avery");

    let settings_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(ctx.db.pool())
            .await
            .unwrap();
    assert_eq!(settings_rows, 1);

    ctx.cleanup_user(user_id).await;
}

/// Test registration without a name.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_without_name() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/users/register")
        .json(&serde_json::Value::Null)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let user_id: uuid::Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    ctx.cleanup_user(user_id).await;
}

/// Test an unknown token is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_unknown_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .get("/api/users/me")
        .add_header(
            AUTHORIZATION,
            TestContext::auth_header_value("not-a-registered-token"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
