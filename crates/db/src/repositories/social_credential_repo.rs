//! Repository for the `social_credentials` table.

use sqlx::PgPool;

use pressroom_core::types::DbId;

use crate::models::social::{SocialCredential, UpsertSocialCredential};

/// Column list for `social_credentials` queries.
const COLUMNS: &str = "\
    id, user_id, platform, member_urn, \
    access_token_enc, refresh_token_enc, expires_at, scope, \
    created_at, updated_at";

/// Provides storage for sealed third-party OAuth credentials.
pub struct SocialCredentialRepo;

impl SocialCredentialRepo {
    /// Store a credential, replacing any existing one for the same
    /// (user, platform). Reconnecting always supersedes the old tokens.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSocialCredential,
    ) -> Result<SocialCredential, sqlx::Error> {
        let query = format!(
            "INSERT INTO social_credentials \
                 (user_id, platform, member_urn, access_token_enc, \
                  refresh_token_enc, expires_at, scope) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_social_credentials_user_platform \
             DO UPDATE SET member_urn = $3, access_token_enc = $4, \
                           refresh_token_enc = $5, expires_at = $6, \
                           scope = $7, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SocialCredential>(&query)
            .bind(input.user_id)
            .bind(&input.platform)
            .bind(&input.member_urn)
            .bind(&input.access_token_enc)
            .bind(&input.refresh_token_enc)
            .bind(input.expires_at)
            .bind(&input.scope)
            .fetch_one(pool)
            .await
    }

    /// Find a user's credential for a platform.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
        platform: &str,
    ) -> Result<Option<SocialCredential>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM social_credentials \
             WHERE user_id = $1 AND platform = $2"
        );
        sqlx::query_as::<_, SocialCredential>(&query)
            .bind(user_id)
            .bind(platform)
            .fetch_optional(pool)
            .await
    }

    /// Remove a user's credential for a platform (disconnect).
    pub async fn delete_by_user(
        pool: &PgPool,
        user_id: DbId,
        platform: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM social_credentials WHERE user_id = $1 AND platform = $2",
        )
        .bind(user_id)
        .bind(platform)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
