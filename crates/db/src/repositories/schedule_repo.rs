//! Repository for the `scheduled_jobs` queue.
//!
//! The claim path uses `FOR UPDATE SKIP LOCKED` so two concurrent sweeps
//! can never both claim the same job.

use sqlx::types::Json;
use sqlx::PgPool;

use pressroom_core::types::{DbId, Timestamp};

use crate::models::schedule::{CreateSchedule, ScheduledJob};
use crate::models::status::ScheduleStatus;

/// Column list for `scheduled_jobs` queries.
const COLUMNS: &str = "\
    id, content_id, requested_by, run_at, targets, status_id, \
    claimed_at, completed_at, last_error, \
    created_at, updated_at";

/// Provides queue operations for scheduled publish jobs.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Persist a new pending job. Timestamp validation (strictly future)
    /// happens in the caller, which owns the clock.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSchedule,
    ) -> Result<ScheduledJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO scheduled_jobs (content_id, requested_by, run_at, targets, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledJob>(&query)
            .bind(input.content_id)
            .bind(input.requested_by)
            .bind(input.run_at)
            .bind(Json(input.targets.clone()))
            .bind(ScheduleStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Count due pending jobs as of `now`. The sweep reports this as the
    /// skipped count when its wall-clock budget runs out first.
    pub async fn count_due(pool: &PgPool, now: Timestamp) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM scheduled_jobs WHERE status_id = $1 AND run_at <= $2",
        )
        .bind(ScheduleStatus::Pending.id())
        .bind(now)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Find a job by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScheduledJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scheduled_jobs WHERE id = $1");
        sqlx::query_as::<_, ScheduledJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all jobs for a content id, newest first.
    pub async fn list_for_content(
        pool: &PgPool,
        content_id: DbId,
    ) -> Result<Vec<ScheduledJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scheduled_jobs \
             WHERE content_id = $1 \
             ORDER BY run_at DESC"
        );
        sqlx::query_as::<_, ScheduledJob>(&query)
            .bind(content_id)
            .fetch_all(pool)
            .await
    }

    /// Cancel all still-pending jobs for a content id. Returns how many
    /// rows were cancelled; zero is a valid no-op (the job may already
    /// have executed, which is not an error).
    pub async fn cancel_pending(pool: &PgPool, content_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scheduled_jobs \
             SET status_id = $2, updated_at = NOW() \
             WHERE content_id = $1 AND status_id = $3",
        )
        .bind(content_id)
        .bind(ScheduleStatus::Cancelled.id())
        .bind(ScheduleStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Atomically claim the next due pending job.
    ///
    /// `now` is passed in rather than read from the database clock so the
    /// sweep owns a single consistent notion of "due" and tests can drive
    /// a simulated clock. Uses `FOR UPDATE SKIP LOCKED` to prevent
    /// double-firing when two sweep invocations overlap.
    pub async fn claim_next_due(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Option<ScheduledJob>, sqlx::Error> {
        let query = format!(
            "UPDATE scheduled_jobs \
             SET status_id = $1, claimed_at = NOW(), updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM scheduled_jobs \
                 WHERE status_id = $2 AND run_at <= $3 \
                 ORDER BY run_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledJob>(&query)
            .bind(ScheduleStatus::Executing.id())
            .bind(ScheduleStatus::Pending.id())
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a claimed job as successfully executed.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scheduled_jobs \
             SET status_id = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ScheduleStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Resolve a claimed job as failed, recording the error.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE scheduled_jobs \
             SET status_id = $2, completed_at = NOW(), last_error = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ScheduleStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Requeue jobs claimed before `cutoff` that were never resolved
    /// (process crash mid-job). Returns the number of requeued rows.
    pub async fn requeue_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scheduled_jobs \
             SET status_id = $1, claimed_at = NULL, updated_at = NOW() \
             WHERE status_id = $2 AND claimed_at < $3",
        )
        .bind(ScheduleStatus::Pending.id())
        .bind(ScheduleStatus::Executing.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            tracing::warn!(
                count = result.rows_affected(),
                "Requeued stale claimed jobs"
            );
        }
        Ok(result.rows_affected())
    }
}
