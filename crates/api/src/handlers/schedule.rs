//! Handlers for scheduling, cancellation, and the sweep endpoint.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use pressroom_core::error::CoreError;
use pressroom_core::types::DbId;
use pressroom_db::models::schedule::CreateSchedule;
use pressroom_db::repositories::ScheduleRepo;
use pressroom_pipeline::sweep::{run_sweep, TARGET_ARTICLE, TARGET_LINKEDIN};

use crate::error::{AppError, AppResult};
use crate::handlers::topic::require_topic;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header the periodic invoker uses to authenticate sweep calls.
const SWEEP_SECRET_HEADER: &str = "x-sweep-secret";

/// POST /api/v1/schedule
///
/// Persist an intent to publish `content_id` at `run_at`. Fails with
/// `INVALID_SCHEDULE` unless `run_at` is strictly in the future.
pub async fn create_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateSchedule>,
) -> AppResult<impl IntoResponse> {
    auth.require_role(&["editor"])?;

    if input.run_at <= Utc::now() {
        return Err(AppError::Core(CoreError::InvalidSchedule(format!(
            "run_at {} is not in the future",
            input.run_at
        ))));
    }
    if input.targets.is_empty() {
        return Err(AppError::Core(CoreError::InvalidSchedule(
            "targets must not be empty".into(),
        )));
    }
    for target in &input.targets {
        if target != TARGET_ARTICLE && target != TARGET_LINKEDIN {
            return Err(AppError::Core(CoreError::InvalidSchedule(format!(
                "unknown target channel: {target}"
            ))));
        }
    }

    require_topic(&state, input.content_id).await?;

    input.requested_by = auth.user_id;
    let job = ScheduleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        job_id = job.id,
        content_id = job.content_id,
        run_at = %job.run_at,
        "Publish scheduled"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// DELETE /api/v1/schedule/{content_id}
///
/// Cancel all still-pending jobs for a content id. Cancelling nothing is
/// a no-op, not an error -- the job may already have executed.
pub async fn cancel_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(content_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cancelled = ScheduleRepo::cancel_pending(&state.pool, content_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        content_id,
        cancelled,
        "Schedule cancellation requested"
    );

    Ok(Json(DataResponse {
        data: json!({ "cancelled": cancelled }),
    }))
}

/// GET /api/v1/schedule/{content_id}
///
/// List jobs for a content id.
pub async fn list_schedules(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(content_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let jobs = ScheduleRepo::list_for_content(&state.pool, content_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// POST /api/v1/schedule/sweep
///
/// Execute one sweep over the due jobs. Called by the external periodic
/// invoker, authenticated via the `X-Sweep-Secret` header when a secret
/// is configured. Not authenticated as a user: the invoker is a machine.
pub async fn sweep(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    if let Some(expected) = &state.config.sweep_secret {
        let presented = headers
            .get(SWEEP_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Err(AppError::Core(CoreError::Forbidden(
                "invalid or missing sweep secret".into(),
            )));
        }
    }

    let report = run_sweep(
        &state.pool,
        &state.publisher,
        &state.social,
        &state.sweep_config,
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}
