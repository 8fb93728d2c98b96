mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::{build_test_app, send};

#[sqlx::test(migrations = "../db/migrations")]
async fn health_is_public(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
