//! Authentication boundary tests: every mutating endpoint rejects
//! missing or malformed tokens, and the sweep endpoint enforces its
//! shared secret instead.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{auth_token, auth_token_with_role, build_test_app, send, TEST_SWEEP_SECRET};

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/topics",
        None,
        Some(json!({ "title": "A topic" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/topics",
        Some("not-a-real-token"),
        Some(json!({ "title": "A topic" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn valid_token_is_accepted(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/topics",
        Some(&auth_token()),
        Some(json!({ "title": "A topic" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "A topic");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn publishing_requires_the_editor_role(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/topics/1/publish-article",
        Some(&auth_token_with_role("viewer")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_rejects_a_missing_secret(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = send(&app, "POST", "/api/v1/schedule/sweep", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sweep_accepts_the_shared_secret(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let app = build_test_app(pool);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/schedule/sweep")
        .header("x-sweep-secret", TEST_SWEEP_SECRET)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["executed"], 0);
}
