//! Repository for the `content_drafts` table.
//!
//! One row per (topic, content type, language); the unique constraint
//! `uq_content_drafts_topic_type_lang` backs the one-authoritative-URL
//! invariant, so re-generation and re-publication update in place.

use sqlx::PgPool;

use pressroom_core::types::DbId;

use crate::models::content::{ContentDraft, CreateContentDraft};
use crate::models::status::{ContentType, PublishStatus};

/// Column list for `content_drafts` queries.
const COLUMNS: &str = "\
    id, topic_id, content_type_id, language, title, body, \
    publish_status_id, publish_attempts, last_attempt_at, last_error, \
    slug, url, external_permalink, published_at, \
    created_at, updated_at";

/// Provides CRUD operations for content drafts.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a draft, or refresh the body of the existing row for the same
    /// (topic, type, language) when a generation stage reruns.
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateContentDraft,
    ) -> Result<ContentDraft, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_drafts \
                 (topic_id, content_type_id, language, title, body, publish_status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_content_drafts_topic_type_lang \
             DO UPDATE SET title = $4, body = $5, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(input.topic_id)
            .bind(input.content_type_id)
            .bind(&input.language)
            .bind(&input.title)
            .bind(&input.body)
            .bind(PublishStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find a draft by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContentDraft>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_drafts WHERE id = $1");
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the draft for a (topic, type, language) combination.
    pub async fn find_for_topic(
        pool: &PgPool,
        topic_id: DbId,
        content_type: ContentType,
        language: &str,
    ) -> Result<Option<ContentDraft>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_drafts \
             WHERE topic_id = $1 AND content_type_id = $2 AND language = $3"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(topic_id)
            .bind(content_type.id())
            .bind(language)
            .fetch_optional(pool)
            .await
    }

    /// List all drafts for a topic.
    pub async fn list_for_topic(
        pool: &PgPool,
        topic_id: DbId,
    ) -> Result<Vec<ContentDraft>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_drafts \
             WHERE topic_id = $1 \
             ORDER BY content_type_id, language"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(topic_id)
            .fetch_all(pool)
            .await
    }

    /// Stamp a draft as published on the owned site: sets slug, URL, and
    /// publish timestamp, bumps the attempt counter, and clears any stale
    /// error. `published_at` is only set on the first publish so a
    /// republish keeps the original publication time.
    pub async fn stamp_published(
        pool: &PgPool,
        id: DbId,
        slug: &str,
        url: &str,
    ) -> Result<ContentDraft, sqlx::Error> {
        let query = format!(
            "UPDATE content_drafts \
             SET publish_status_id = $2, slug = $3, url = $4, \
                 publish_attempts = publish_attempts + 1, \
                 last_attempt_at = NOW(), last_error = NULL, \
                 published_at = COALESCE(published_at, NOW()), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .bind(PublishStatus::Published.id())
            .bind(slug)
            .bind(url)
            .fetch_one(pool)
            .await
    }

    /// Record a failed publish attempt.
    pub async fn record_publish_failure(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE content_drafts \
             SET publish_status_id = $2, \
                 publish_attempts = publish_attempts + 1, \
                 last_attempt_at = NOW(), last_error = $3, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(PublishStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a social post as delivered to the external platform.
    pub async fn mark_posted(
        pool: &PgPool,
        id: DbId,
        permalink: &str,
    ) -> Result<ContentDraft, sqlx::Error> {
        let query = format!(
            "UPDATE content_drafts \
             SET publish_status_id = $2, external_permalink = $3, \
                 last_error = NULL, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .bind(PublishStatus::Posted.id())
            .bind(permalink)
            .fetch_one(pool)
            .await
    }

    /// Record a failed external delivery. The draft keeps its `published`
    /// status — the content is committed to the owned record regardless —
    /// and the error string marks it for manual retry.
    pub async fn record_delivery_error(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE content_drafts \
             SET last_error = $2, last_attempt_at = NOW(), \
                 publish_attempts = publish_attempts + 1, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
