//! Shared test harness: builds the full application router with the
//! production middleware stack, a stub draft generator, and a social
//! publisher pointed at an unroutable endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pressroom_api::auth::jwt::{generate_access_token, JwtConfig};
use pressroom_api::config::ServerConfig;
use pressroom_api::generator::{DraftGenerator, GeneratedArticle, GeneratedPost, GeneratorError};
use pressroom_api::router::build_app_router;
use pressroom_api::state::AppState;
use pressroom_core::crypto::CredentialCipher;
use pressroom_pipeline::indexing::IndexingNotifier;
use pressroom_pipeline::publisher::Publisher;
use pressroom_pipeline::sweep::SweepConfig;
use pressroom_social::linkedin::LinkedInClient;
use pressroom_social::oauth::OAuthConfig;
use pressroom_social::publisher::SocialPublisher;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_SWEEP_SECRET: &str = "test-sweep-secret";

/// Canned generator: deterministic drafts, no network.
pub struct StubGenerator;

#[async_trait]
impl DraftGenerator for StubGenerator {
    async fn generate_prompt(
        &self,
        title: &str,
        _description: Option<&str>,
        _keywords: &[String],
    ) -> Result<String, GeneratorError> {
        Ok(format!("Write a bilingual article about {title}"))
    }

    async fn generate_article(
        &self,
        title: &str,
        _prompt: &str,
    ) -> Result<GeneratedArticle, GeneratorError> {
        Ok(GeneratedArticle {
            title_en: title.to_string(),
            body_en: "The english body.".to_string(),
            title_ar: format!("{title} (ar)"),
            body_ar: "النص العربي".to_string(),
        })
    }

    async fn generate_post(
        &self,
        _title: &str,
        article_url: &str,
    ) -> Result<GeneratedPost, GeneratorError> {
        Ok(GeneratedPost {
            body_en: format!("Read our new article: {article_url}"),
            body_ar: format!("اقرأ مقالنا الجديد: {article_url}"),
        })
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        site_base_url: "https://example.com".to_string(),
        sweep_secret: Some(TEST_SWEEP_SECRET.to_string()),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    }
}

/// Build the full application router against the given pool, mirroring
/// the construction in `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let social = Arc::new(SocialPublisher::new(
        LinkedInClient::with_base_urls(
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:1".to_string(),
            2,
        ),
        CredentialCipher::new("test-credential-key"),
        OAuthConfig {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            redirect_uri: "http://localhost/api/v1/social/linkedin/callback".into(),
        },
    ));
    let publisher = Arc::new(Publisher::new(
        config.site_base_url.clone(),
        IndexingNotifier::new(None),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        publisher,
        social,
        generator: Arc::new(StubGenerator),
        sweep_config: Arc::new(SweepConfig::default()),
    };

    build_app_router(state, &config)
}

/// Mint a Bearer token for test user 42 (`editor` role).
pub fn auth_token() -> String {
    auth_token_with_role("editor")
}

/// Mint a Bearer token for test user 42 with an arbitrary role.
pub fn auth_token_with_role(role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
    };
    generate_access_token(42, role, &config).unwrap()
}

/// Issue a request and return `(status, parsed JSON body)`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
