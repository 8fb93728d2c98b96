//! Repository for the `topics` table.
//!
//! Status changes go through [`TopicRepo::transition`], a conditional
//! update keyed on the expected current status. A lost race returns
//! `None` instead of silently overwriting a concurrent writer.

use sqlx::types::Json;
use sqlx::PgPool;

use pressroom_core::artifacts::TopicArtifacts;
use pressroom_core::pipeline::TopicStatus;
use pressroom_core::types::{DbId, Timestamp};

use crate::models::status::TopicSource;
use crate::models::topic::{CreateTopic, Topic};

/// Column list for `topics` queries.
const COLUMNS: &str = "\
    id, title, description, source_id, keywords, priority, \
    locked, locked_by, locked_at, status_id, \
    prompt_artifacts, article_artifacts, linkedin_artifacts, \
    created_at, updated_at";

/// The transient-to-stable fallback pairs used by stale-topic recovery.
const STALE_REVERTS: [(TopicStatus, TopicStatus); 2] = [
    (TopicStatus::ArticleGenerating, TopicStatus::PromptApproved),
    (TopicStatus::Publishing, TopicStatus::ArticleApproved),
];

/// Provides CRUD and transition operations for topics.
pub struct TopicRepo;

impl TopicRepo {
    /// Create a new topic in `pending` status.
    pub async fn create(pool: &PgPool, input: &CreateTopic) -> Result<Topic, sqlx::Error> {
        let query = format!(
            "INSERT INTO topics (title, description, source_id, keywords, priority, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.source_id.unwrap_or(TopicSource::Manual.id()))
            .bind(Json(input.keywords.clone().unwrap_or_default()))
            .bind(input.priority.unwrap_or(0))
            .bind(TopicStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a topic by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Conditionally move a topic from `from` to `to`, persisting the merged
    /// artifact set in the same write.
    ///
    /// Returns `None` when the row is no longer in `from` — the caller lost
    /// a race or drove the pipeline out of order.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: TopicStatus,
        to: TopicStatus,
        artifacts: &TopicArtifacts,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics \
             SET status_id = $3, \
                 prompt_artifacts = $4, \
                 article_artifacts = $5, \
                 linkedin_artifacts = $6, \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(artifacts.prompt.clone().map(Json))
            .bind(artifacts.article.clone().map(Json))
            .bind(artifacts.linkedin.clone().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Persist the artifact columns without touching the status.
    ///
    /// Used to record stage output (e.g. a delivery error) on a topic
    /// whose pipeline position does not change.
    pub async fn save_artifacts(
        pool: &PgPool,
        id: DbId,
        artifacts: &TopicArtifacts,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics \
             SET prompt_artifacts = $2, \
                 article_artifacts = $3, \
                 linkedin_artifacts = $4, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(artifacts.prompt.clone().map(Json))
            .bind(artifacts.article.clone().map(Json))
            .bind(artifacts.linkedin.clone().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Acquire the advisory edit lock. Returns `None` if already locked.
    pub async fn lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics \
             SET locked = true, locked_by = $2, locked_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND locked = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Release the advisory edit lock held by `user_id`. Returns `None`
    /// when the topic is not locked by that user.
    pub async fn unlock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics \
             SET locked = false, locked_by = NULL, locked_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND locked = true AND locked_by = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Revert topics stuck in a transient status since before `cutoff` back
    /// to their last stable state. Returns the number of reverted rows.
    ///
    /// This is the crash-recovery path: a process that died mid-publish
    /// leaves its topic in `article_generating`/`publishing` forever, and
    /// the periodic sweep calls this to make those topics drivable again.
    pub async fn revert_stale_transients(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let mut reverted = 0;
        for (stuck, stable) in STALE_REVERTS {
            let result = sqlx::query(
                "UPDATE topics SET status_id = $2, updated_at = NOW() \
                 WHERE status_id = $1 AND updated_at < $3",
            )
            .bind(stuck.id())
            .bind(stable.id())
            .bind(cutoff)
            .execute(pool)
            .await?;
            if result.rows_affected() > 0 {
                tracing::warn!(
                    from = stuck.name(),
                    to = stable.name(),
                    count = result.rows_affected(),
                    "Reverted topics stuck in a transient status"
                );
            }
            reverted += result.rows_affected();
        }
        Ok(reverted)
    }
}
