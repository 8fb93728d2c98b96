//! Content draft entity models and DTOs.

use pressroom_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `content_drafts` table.
///
/// One row per (topic, content type, language). The `url` column is the
/// single authoritative published URL for that combination; republishing
/// updates it in place rather than inserting a sibling row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentDraft {
    pub id: DbId,
    pub topic_id: DbId,
    pub content_type_id: StatusId,
    pub language: String,
    pub title: String,
    pub body: String,
    pub publish_status_id: StatusId,
    /// Monotonically increasing delivery attempt counter.
    pub publish_attempts: i32,
    pub last_attempt_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub external_permalink: Option<String>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a draft when a generation stage completes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentDraft {
    pub topic_id: DbId,
    pub content_type_id: StatusId,
    pub language: String,
    pub title: String,
    pub body: String,
}
