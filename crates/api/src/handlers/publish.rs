//! Handlers delegating to the publication executor.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use pressroom_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/topics/{id}/publish-article
///
/// Publish the approved bilingual drafts to the owned site. Idempotent
/// for topics already published.
pub async fn publish_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_role(&["editor"])?;

    let result = state.publisher.publish_article(&state.pool, id).await?;

    tracing::info!(
        user_id = auth.user_id,
        topic_id = id,
        already_published = result.already_published,
        "Publish article requested"
    );

    Ok(Json(DataResponse { data: result }))
}

#[derive(Debug, Deserialize, Default)]
pub struct PublishLinkedinRequest {
    /// Which language edition to post. Defaults to English.
    pub language: Option<String>,
}

/// POST /api/v1/topics/{id}/publish-linkedin
///
/// Deliver the approved LinkedIn post using the caller's stored
/// credential. The response's `warning` field is set when the post was
/// committed locally but delivery must be retried manually.
pub async fn publish_linkedin(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PublishLinkedinRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_role(&["editor"])?;

    let language = input.language.unwrap_or_else(|| "en".to_string());

    let result = state
        .publisher
        .publish_social_post(&state.pool, &state.social, id, &language, auth.user_id)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        topic_id = id,
        language = %language,
        delivered = result.permalink.is_some(),
        "Publish LinkedIn requested"
    );

    Ok(Json(DataResponse { data: result }))
}
