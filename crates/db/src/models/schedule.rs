//! Scheduled job entity models and DTOs.

use pressroom_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `scheduled_jobs` table: a persisted intent to publish a
/// topic's content at or after `run_at`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledJob {
    pub id: DbId,
    /// The topic whose content this job publishes.
    pub content_id: DbId,
    /// Who scheduled the job; their social credential is used at execution.
    pub requested_by: DbId,
    pub run_at: Timestamp,
    /// Target channels, e.g. `["linkedin"]` or `["article"]`.
    pub targets: Json<Vec<String>>,
    pub status_id: StatusId,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/schedule`. `requested_by` comes from the
/// authenticated caller, not the request body.
#[derive(Debug, Deserialize)]
pub struct CreateSchedule {
    pub content_id: DbId,
    /// Must be strictly in the future at creation time.
    pub run_at: Timestamp,
    pub targets: Vec<String>,
    #[serde(skip)]
    pub requested_by: DbId,
}
