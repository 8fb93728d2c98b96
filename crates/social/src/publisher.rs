//! Normalized post delivery over stored credentials.
//!
//! [`SocialPublisher::post`] is the single entry point the pipeline uses
//! to deliver a post. It resolves and unseals the caller's credential,
//! refuses fast when the connection is absent or expired, and folds every
//! network outcome into [`PostOutcome`].

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use pressroom_core::crypto::{CredentialCipher, CryptoError};
use pressroom_core::types::DbId;
use pressroom_db::models::social::{CredentialStatus, SocialCredential, UpsertSocialCredential};
use pressroom_db::repositories::SocialCredentialRepo;

use crate::linkedin::{permalink_for, LinkedInClient, LinkedInError};
use crate::oauth::OAuthConfig;
use crate::PLATFORM_LINKEDIN;

/// Error string returned when no credential is stored for the caller.
pub const ERR_NOT_CONNECTED: &str = "NotConnected";

/// Error string returned when the stored token has expired and no refresh
/// path succeeded.
pub const ERR_EXPIRED: &str = "Expired";

/// A post to deliver.
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub text: String,
    /// Article URL the post links to.
    pub url: String,
    pub images: Vec<String>,
}

/// Normalized delivery result. `success` is the only field callers need
/// to branch on; `error` is a stable, loggable string.
#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub success: bool,
    pub permalink: Option<String>,
    pub error: Option<String>,
}

impl PostOutcome {
    fn delivered(permalink: String) -> Self {
        Self {
            success: true,
            permalink: Some(permalink),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            permalink: None,
            error: Some(error.into()),
        }
    }
}

/// Errors from the OAuth connection flow.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    LinkedIn(#[from] LinkedInError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Derived metadata for an optional credential row.
fn status_of(credential: Option<&SocialCredential>) -> CredentialStatus {
    CredentialStatus {
        connected: credential.is_some(),
        platform: PLATFORM_LINKEDIN.to_string(),
        expires_at: credential.and_then(|c| c.expires_at),
        scope: credential.and_then(|c| c.scope.clone()),
    }
}

/// Delivers posts to LinkedIn using sealed, stored credentials.
pub struct SocialPublisher {
    client: LinkedInClient,
    cipher: CredentialCipher,
    oauth: OAuthConfig,
}

impl SocialPublisher {
    pub fn new(client: LinkedInClient, cipher: CredentialCipher, oauth: OAuthConfig) -> Self {
        Self {
            client,
            cipher,
            oauth,
        }
    }

    /// Authorization URL for the consent redirect (OAuth step one).
    pub fn authorize_url(&self, state: &str) -> String {
        self.oauth.authorize_url(state)
    }

    /// Complete the connection flow (OAuth step three): exchange the code,
    /// pin the member URN, seal the tokens, and store the credential.
    pub async fn complete_connection(
        &self,
        pool: &PgPool,
        user_id: DbId,
        code: &str,
    ) -> Result<CredentialStatus, ConnectError> {
        let tokens = self
            .client
            .exchange_code(
                code,
                &self.oauth.client_id,
                &self.oauth.client_secret,
                &self.oauth.redirect_uri,
            )
            .await?;
        let member_urn = self.client.fetch_member_urn(&tokens.access_token).await?;

        let access_token_enc = self.cipher.seal(&tokens.access_token)?;
        let refresh_token_enc = match &tokens.refresh_token {
            Some(token) => Some(self.cipher.seal(token)?),
            None => None,
        };
        let expires_at = Some(Utc::now() + Duration::seconds(tokens.expires_in));

        let credential = SocialCredentialRepo::upsert(
            pool,
            &UpsertSocialCredential {
                user_id,
                platform: PLATFORM_LINKEDIN.to_string(),
                member_urn: Some(member_urn),
                access_token_enc,
                refresh_token_enc,
                expires_at,
                scope: tokens.scope,
            },
        )
        .await?;

        tracing::info!(user_id, "LinkedIn connection established");
        Ok(status_of(Some(&credential)))
    }

    /// Derived connection metadata for status endpoints. Never exposes
    /// token material.
    pub async fn connection_status(
        &self,
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<CredentialStatus, sqlx::Error> {
        let credential =
            SocialCredentialRepo::find_by_user(pool, user_id, PLATFORM_LINKEDIN).await?;
        Ok(status_of(credential.as_ref()))
    }

    /// Remove the stored credential (disconnect).
    pub async fn disconnect(&self, pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let removed =
            SocialCredentialRepo::delete_by_user(pool, user_id, PLATFORM_LINKEDIN).await?;
        Ok(removed > 0)
    }

    /// Deliver a post as `user_id`.
    ///
    /// Never attempts the network call when the credential is absent or
    /// expired beyond refresh; those cases return synchronously with
    /// [`ERR_NOT_CONNECTED`] / [`ERR_EXPIRED`].
    pub async fn post(&self, pool: &PgPool, user_id: DbId, request: &PostRequest) -> PostOutcome {
        let credential =
            match SocialCredentialRepo::find_by_user(pool, user_id, PLATFORM_LINKEDIN).await {
                Ok(Some(credential)) => credential,
                Ok(None) => return PostOutcome::failed(ERR_NOT_CONNECTED),
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Credential lookup failed");
                    return PostOutcome::failed(format!("credential lookup failed: {e}"));
                }
            };

        let Some(author_urn) = credential.member_urn.clone() else {
            // A credential without an author URN cannot post; treat as not
            // connected so the caller re-runs the connect flow.
            return PostOutcome::failed(ERR_NOT_CONNECTED);
        };

        let access_token = match self.usable_access_token(pool, credential).await {
            Ok(token) => token,
            Err(outcome) => return *outcome,
        };

        match self
            .client
            .create_post(
                &access_token,
                &author_urn,
                &request.text,
                &request.url,
                &request.images,
            )
            .await
        {
            Ok(share_urn) => {
                tracing::info!(user_id, share_urn = %share_urn, "LinkedIn post delivered");
                PostOutcome::delivered(permalink_for(&share_urn))
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "LinkedIn post failed");
                PostOutcome::failed(e.to_string())
            }
        }
    }

    /// Unseal the access token, refreshing it first when expired.
    ///
    /// Returns the failure outcome directly so `post` can bail without
    /// ever touching the post endpoint.
    async fn usable_access_token(
        &self,
        pool: &PgPool,
        credential: SocialCredential,
    ) -> Result<String, Box<PostOutcome>> {
        let expired = credential
            .expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now());

        if !expired {
            return self
                .cipher
                .open(&credential.access_token_enc)
                .map_err(|e| {
                    tracing::error!(credential_id = credential.id, error = %e, "Failed to unseal access token");
                    Box::new(PostOutcome::failed("credential could not be unsealed"))
                });
        }

        let Some(refresh_enc) = credential.refresh_token_enc.as_deref() else {
            return Err(Box::new(PostOutcome::failed(ERR_EXPIRED)));
        };
        let refresh_token = self
            .cipher
            .open(refresh_enc)
            .map_err(|_| Box::new(PostOutcome::failed(ERR_EXPIRED)))?;

        match self
            .client
            .refresh_token(&refresh_token, &self.oauth.client_id, &self.oauth.client_secret)
            .await
        {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                if let Err(e) = self.store_refreshed(pool, &credential, tokens).await {
                    // The new token still works for this post; losing the
                    // write only means refreshing again next time.
                    tracing::warn!(credential_id = credential.id, error = %e, "Failed to persist refreshed token");
                }
                Ok(access_token)
            }
            Err(e) => {
                tracing::warn!(credential_id = credential.id, error = %e, "Token refresh failed");
                Err(Box::new(PostOutcome::failed(ERR_EXPIRED)))
            }
        }
    }

    async fn store_refreshed(
        &self,
        pool: &PgPool,
        credential: &SocialCredential,
        tokens: crate::linkedin::TokenResponse,
    ) -> anyhow::Result<()> {
        let access_token_enc = self.cipher.seal(&tokens.access_token)?;
        let refresh_token_enc = match &tokens.refresh_token {
            Some(token) => Some(self.cipher.seal(token)?),
            None => credential.refresh_token_enc.clone(),
        };
        SocialCredentialRepo::upsert(
            pool,
            &UpsertSocialCredential {
                user_id: credential.user_id,
                platform: credential.platform.clone(),
                member_urn: credential.member_urn.clone(),
                access_token_enc,
                refresh_token_enc,
                expires_at: Some(Utc::now() + Duration::seconds(tokens.expires_in)),
                scope: tokens.scope.clone().or_else(|| credential.scope.clone()),
            },
        )
        .await?;
        Ok(())
    }
}
