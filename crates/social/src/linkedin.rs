//! HTTP client for the LinkedIn REST API.
//!
//! [`LinkedInClient`] holds the connection configuration for the LinkedIn
//! API. All requests run with a bounded timeout; exceeding it surfaces as
//! a [`LinkedInError::Transport`], never a hang.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

/// Default request timeout for LinkedIn calls.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Production API base URL.
const API_BASE: &str = "https://api.linkedin.com";

/// Production OAuth base URL.
const OAUTH_BASE: &str = "https://www.linkedin.com";

/// Client for the LinkedIn UGC post and OAuth token endpoints.
pub struct LinkedInClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

/// Token material returned by the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds from now.
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Errors that can occur when calling LinkedIn.
#[derive(Debug, thiserror::Error)]
pub enum LinkedInError {
    /// Connection failure, timeout, or other transport-level problem.
    #[error("Transport error: {0}")]
    Transport(String),

    /// LinkedIn answered with a non-success status.
    #[error("LinkedIn returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LinkedInClient {
    /// Create a client against the production endpoints.
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self::with_base_urls(
            API_BASE.to_string(),
            OAUTH_BASE.to_string(),
            timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client against custom base URLs (tests point this at a
    /// local stub).
    pub fn with_base_urls(api_base: String, oauth_base: String, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            http,
            api_base,
            oauth_base,
        }
    }

    /// Create a UGC post and return its share URN.
    pub async fn create_post(
        &self,
        access_token: &str,
        author_urn: &str,
        text: &str,
        article_url: &str,
        images: &[String],
    ) -> Result<String, LinkedInError> {
        let payload = build_share_payload(author_urn, text, article_url, images);

        let response = self
            .http
            .post(format!("{}/v2/ugcPosts", self.api_base))
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkedInError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The share URN arrives in the x-restli-id header; fall back to the
        // body's id field.
        if let Some(urn) = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
        {
            return Ok(urn.to_string());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LinkedInError::MalformedResponse(e.to_string()))?;
        body.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| LinkedInError::MalformedResponse("missing post id".into()))
    }

    /// Exchange an authorization code for tokens (OAuth step three).
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, LinkedInError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Attempt to refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, LinkedInError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, LinkedInError> {
        let response = self
            .http
            .post(format!("{}/oauth/v2/accessToken", self.oauth_base))
            .form(form)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkedInError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LinkedInError::MalformedResponse(e.to_string()))
    }

    /// Fetch the authenticated member's URN via the OpenID userinfo
    /// endpoint. Used once at connect time to pin the post author.
    pub async fn fetch_member_urn(&self, access_token: &str) -> Result<String, LinkedInError> {
        let response = self
            .http
            .get(format!("{}/v2/userinfo", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LinkedInError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkedInError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LinkedInError::MalformedResponse(e.to_string()))?;
        body.get("sub")
            .and_then(|v| v.as_str())
            .map(|sub| format!("urn:li:person:{sub}"))
            .ok_or_else(|| LinkedInError::MalformedResponse("missing sub claim".into()))
    }
}

/// Build the UGC share payload for an article post. The article URL is the
/// primary media entry; any image URLs follow it.
fn build_share_payload(
    author_urn: &str,
    text: &str,
    article_url: &str,
    images: &[String],
) -> serde_json::Value {
    let mut media = vec![json!({
        "status": "READY",
        "originalUrl": article_url,
    })];
    for image in images {
        media.push(json!({
            "status": "READY",
            "originalUrl": image,
        }));
    }

    json!({
        "author": author_urn,
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": { "text": text },
                "shareMediaCategory": "ARTICLE",
                "media": media,
            },
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC",
        },
    })
}

/// Public feed URL for a share URN.
pub fn permalink_for(share_urn: &str) -> String {
    format!("https://www.linkedin.com/feed/update/{share_urn}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_payload_shape() {
        let payload = build_share_payload(
            "urn:li:person:abc",
            "Read our new article",
            "https://example.com/en/blog/lease-renewals",
            &[],
        );
        assert_eq!(payload["author"], "urn:li:person:abc");
        assert_eq!(payload["lifecycleState"], "PUBLISHED");
        let share = &payload["specificContent"]["com.linkedin.ugc.ShareContent"];
        assert_eq!(share["shareCommentary"]["text"], "Read our new article");
        assert_eq!(share["shareMediaCategory"], "ARTICLE");
        assert_eq!(
            share["media"][0]["originalUrl"],
            "https://example.com/en/blog/lease-renewals"
        );
    }

    #[test]
    fn share_payload_appends_images_after_article() {
        let payload = build_share_payload(
            "urn:li:person:abc",
            "text",
            "https://example.com/a",
            &["https://example.com/cover.png".to_string()],
        );
        let media = payload["specificContent"]["com.linkedin.ugc.ShareContent"]["media"]
            .as_array()
            .unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[1]["originalUrl"], "https://example.com/cover.png");
    }

    #[test]
    fn permalink_embeds_urn() {
        assert_eq!(
            permalink_for("urn:li:share:123"),
            "https://www.linkedin.com/feed/update/urn:li:share:123"
        );
    }
}
