//! Port for the external AI drafting collaborator.
//!
//! The pipeline never talks to a model directly; it goes through
//! [`DraftGenerator`] so the HTTP implementation can be swapped for a
//! stub in tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Generation request timeout, kept just under the route timeout so the
/// handler surfaces a clean generation error instead of a 408.
const GENERATION_TIMEOUT_SECS: u64 = 25;

/// A bilingual article draft produced by the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedArticle {
    pub title_en: String,
    pub body_en: String,
    pub title_ar: String,
    pub body_ar: String,
}

/// Bilingual social post bodies produced by the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedPost {
    pub body_en: String,
    pub body_ar: String,
}

/// Errors from the drafting collaborator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Generator returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// External drafting collaborator.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Draft the article prompt for a topic.
    async fn generate_prompt(
        &self,
        title: &str,
        description: Option<&str>,
        keywords: &[String],
    ) -> Result<String, GeneratorError>;

    /// Draft the bilingual article from an approved prompt.
    async fn generate_article(
        &self,
        title: &str,
        prompt: &str,
    ) -> Result<GeneratedArticle, GeneratorError>;

    /// Draft the bilingual LinkedIn post bodies for a published article.
    async fn generate_post(
        &self,
        title: &str,
        article_url: &str,
    ) -> Result<GeneratedPost, GeneratorError>;
}

/// HTTP implementation posting to a configured generation service.
pub struct HttpDraftGenerator {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpDraftGenerator {
    pub fn new(endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { http, endpoint }
    }

    /// Load from the `GENERATION_ENDPOINT` env var.
    ///
    /// # Panics
    ///
    /// Panics when unset; generation is a core stage of the pipeline.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GENERATION_ENDPOINT").expect("GENERATION_ENDPOINT must be set"))
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        payload: serde_json::Value,
    ) -> Result<T, GeneratorError> {
        let response = self
            .http
            .post(format!("{}/{operation}", self.endpoint.trim_end_matches('/')))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl DraftGenerator for HttpDraftGenerator {
    async fn generate_prompt(
        &self,
        title: &str,
        description: Option<&str>,
        keywords: &[String],
    ) -> Result<String, GeneratorError> {
        #[derive(Deserialize)]
        struct PromptResponse {
            prompt: String,
        }
        let response: PromptResponse = self
            .call(
                "prompt",
                json!({
                    "title": title,
                    "description": description,
                    "keywords": keywords,
                }),
            )
            .await?;
        Ok(response.prompt)
    }

    async fn generate_article(
        &self,
        title: &str,
        prompt: &str,
    ) -> Result<GeneratedArticle, GeneratorError> {
        self.call("article", json!({ "title": title, "prompt": prompt }))
            .await
    }

    async fn generate_post(
        &self,
        title: &str,
        article_url: &str,
    ) -> Result<GeneratedPost, GeneratorError> {
        self.call("post", json!({ "title": title, "url": article_url }))
            .await
    }
}
