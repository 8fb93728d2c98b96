//! Handlers for topic CRUD, the advisory lock, and explicit stage
//! transitions (the approval edges a human drives).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use pressroom_core::artifacts::ArtifactPatch;
use pressroom_core::error::CoreError;
use pressroom_core::pipeline::{self, TopicStatus};
use pressroom_core::types::DbId;
use pressroom_db::models::content::ContentDraft;
use pressroom_db::models::topic::{CreateTopic, Topic, TransitionRequest};
use pressroom_db::repositories::{ContentRepo, TopicRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Topic plus its drafts, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: Topic,
    pub drafts: Vec<ContentDraft>,
}

/// POST /api/v1/topics
///
/// Create a topic in `pending` status.
pub async fn create_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTopic>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let topic = TopicRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, topic_id = topic.id, "Topic created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: topic })))
}

/// GET /api/v1/topics/{id}
pub async fn get_topic(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let topic = require_topic(&state, id).await?;
    let drafts = ContentRepo::list_for_topic(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TopicDetail { topic, drafts },
    }))
}

/// POST /api/v1/topics/{id}/lock
///
/// Acquire the advisory edit lock.
pub async fn lock_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_topic(&state, id).await?;

    let topic = TopicRepo::lock(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "topic {id} is locked by another editor"
            )))
        })?;

    tracing::info!(user_id = auth.user_id, topic_id = id, "Topic locked");
    Ok(Json(DataResponse { data: topic }))
}

/// POST /api/v1/topics/{id}/unlock
pub async fn unlock_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_topic(&state, id).await?;

    let topic = TopicRepo::unlock(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "topic {id} is not locked by you"
            )))
        })?;

    tracing::info!(user_id = auth.user_id, topic_id = id, "Topic unlocked");
    Ok(Json(DataResponse { data: topic }))
}

/// POST /api/v1/topics/{id}/transition
///
/// Drive an approval edge of the pipeline (e.g. `prompt_approved`,
/// `article_approved`, `linkedin_approved`). Statuses owned by the
/// publishing pipeline itself are rejected -- their dedicated endpoints
/// perform the associated side effects.
pub async fn transition_topic(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<impl IntoResponse> {
    let requested = TopicStatus::from_id(input.status_id)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status id {}", input.status_id)))?;

    if matches!(
        requested,
        TopicStatus::ArticleGenerating
            | TopicStatus::Publishing
            | TopicStatus::Published
            | TopicStatus::LinkedinPublished
    ) {
        return Err(AppError::BadRequest(format!(
            "{} is set by the publishing pipeline, not by a manual transition",
            requested.name()
        )));
    }

    let topic = require_topic(&state, id).await?;
    let current = topic.status()?;

    // Validate and merge through the pure state machine, then persist the
    // result with a conditional write keyed on the status we read.
    let mut pipeline_state = topic.pipeline_state()?;
    pipeline::apply_transition(&mut pipeline_state, requested, ArtifactPatch::default())
        .map_err(AppError::Core)?;

    let updated = TopicRepo::transition(
        &state.pool,
        id,
        current,
        pipeline_state.status,
        &pipeline_state.artifacts,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::PreconditionFailed(format!(
            "topic {id} was modified concurrently"
        )))
    })?;

    tracing::info!(
        user_id = auth.user_id,
        topic_id = id,
        from = current.name(),
        to = requested.name(),
        "Topic transitioned"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Load a topic or fail with 404. Shared by the topic-scoped handlers.
pub async fn require_topic(state: &AppState, id: DbId) -> AppResult<Topic> {
    TopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Topic",
                id,
            })
        })
}
