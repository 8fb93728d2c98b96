//! Social credential entity models.
//!
//! Token columns hold AES-256-GCM sealed bytes. The entity struct is
//! deliberately not `Serialize`: sealed material must never leave the
//! process via a response body. Status endpoints use
//! [`CredentialStatus`], which carries only derived metadata.

use pressroom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `social_credentials` table.
#[derive(Debug, Clone, FromRow)]
pub struct SocialCredential {
    pub id: DbId,
    pub user_id: DbId,
    pub platform: String,
    /// The member URN used as the post author (e.g. `urn:li:person:...`).
    pub member_urn: Option<String>,
    pub access_token_enc: Vec<u8>,
    pub refresh_token_enc: Option<Vec<u8>>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing a credential after a completed OAuth callback.
#[derive(Debug, Clone)]
pub struct UpsertSocialCredential {
    pub user_id: DbId,
    pub platform: String,
    pub member_urn: Option<String>,
    pub access_token_enc: Vec<u8>,
    pub refresh_token_enc: Option<Vec<u8>>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
}

/// Derived connection metadata exposed to clients. Never includes token
/// material, sealed or otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub connected: bool,
    pub platform: String,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
}
