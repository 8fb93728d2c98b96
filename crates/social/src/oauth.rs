//! LinkedIn OAuth connection flow configuration.
//!
//! The connection dance is: `connect` generates a random state token and
//! binds it to a short-lived cookie before redirecting to LinkedIn;
//! `callback` verifies the returned state against that cookie exactly
//! once, discards it, and exchanges the code for tokens.

/// Name of the short-lived cookie binding the CSRF state token.
pub const STATE_COOKIE: &str = "pressroom_oauth_state";

/// State cookie lifetime. A consent screen round-trip that takes longer
/// than this restarts the flow.
pub const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

/// Scopes requested at connect time: identity for the author URN, member
/// social for posting.
pub const SCOPES: &str = "openid profile w_member_social";

/// OAuth application settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Absolute URL of the callback endpoint registered with LinkedIn.
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Load from `LINKEDIN_CLIENT_ID`, `LINKEDIN_CLIENT_SECRET`, and
    /// `LINKEDIN_REDIRECT_URI`.
    ///
    /// # Panics
    ///
    /// Panics if any of the three variables is missing; a deployment with
    /// the social surface enabled but unconfigured should fail at startup.
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("LINKEDIN_CLIENT_ID")
                .expect("LINKEDIN_CLIENT_ID must be set"),
            client_secret: std::env::var("LINKEDIN_CLIENT_SECRET")
                .expect("LINKEDIN_CLIENT_SECRET must be set"),
            redirect_uri: std::env::var("LINKEDIN_REDIRECT_URI")
                .expect("LINKEDIN_REDIRECT_URI must be set"),
        }
    }

    /// Build the authorization URL for the consent redirect.
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = reqwest::Url::parse("https://www.linkedin.com/oauth/v2/authorization")
            .expect("static URL is valid");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", state)
            .append_pair("scope", SCOPES);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "https://app.example.com/api/v1/social/linkedin/callback".into(),
        }
    }

    #[test]
    fn authorize_url_carries_state_and_scopes() {
        let url = config().authorize_url("state-token-xyz");
        assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=state-token-xyz"));
        assert!(url.contains("w_member_social"));
    }

    #[test]
    fn authorize_url_percent_encodes_redirect() {
        let url = config().authorize_url("s");
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2F"));
    }
}
