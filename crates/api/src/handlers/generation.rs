//! Handlers for the AI drafting stages.
//!
//! The article stage passes through a transient status: `article_generating`
//! is persisted before the generator is called, and the revert edge back to
//! `prompt_approved` is written on the failure path, so a crash mid-call
//! leaves the topic recoverable rather than stuck.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use pressroom_core::artifacts::{LinkedinArtifacts, PromptArtifacts, TopicArtifacts};
use pressroom_core::error::CoreError;
use pressroom_core::pipeline::TopicStatus;
use pressroom_core::types::DbId;
use pressroom_db::models::content::CreateContentDraft;
use pressroom_db::models::status::ContentType;
use pressroom_db::repositories::{ContentRepo, TopicRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::topic::require_topic;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/topics/{id}/generate-prompt
///
/// Draft the article prompt: `pending` -> `prompt_ready`.
pub async fn generate_prompt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let topic = require_topic(&state, id).await?;
    let current = topic.status()?;
    if current != TopicStatus::Pending {
        return Err(AppError::Core(CoreError::PreconditionFailed(format!(
            "topic {id} is {}, expected pending",
            current.name()
        ))));
    }

    let prompt = state
        .generator
        .generate_prompt(&topic.title, topic.description.as_deref(), &topic.keywords.0)
        .await
        .map_err(|e| AppError::InternalError(format!("prompt generation failed: {e}")))?;

    let mut artifacts = topic.artifacts();
    artifacts.merge(TopicArtifacts {
        prompt: Some(PromptArtifacts {
            prompt: Some(prompt),
            model: None,
            generated_at: Some(Utc::now()),
        }),
        ..Default::default()
    });

    let updated = TopicRepo::transition(
        &state.pool,
        id,
        current,
        TopicStatus::PromptReady,
        &artifacts,
    )
    .await?
    .ok_or_else(|| concurrent_modification(id))?;

    tracing::info!(user_id = auth.user_id, topic_id = id, "Prompt drafted");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/topics/{id}/generate-article
///
/// Draft the bilingual article: `prompt_approved` -> `article_generating`
/// -> `article_ready`, reverting to `prompt_approved` on failure.
pub async fn generate_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let topic = require_topic(&state, id).await?;
    let current = topic.status()?;
    if current != TopicStatus::PromptApproved {
        return Err(AppError::Core(CoreError::PreconditionFailed(format!(
            "topic {id} is {}, expected prompt_approved",
            current.name()
        ))));
    }

    let prompt = topic
        .artifacts()
        .prompt
        .and_then(|p| p.prompt)
        .ok_or_else(|| {
            AppError::Core(CoreError::PreconditionFailed(format!(
                "topic {id} has no approved prompt"
            )))
        })?;

    // Enter the transient state before the external call.
    let topic = TopicRepo::transition(
        &state.pool,
        id,
        current,
        TopicStatus::ArticleGenerating,
        &topic.artifacts(),
    )
    .await?
    .ok_or_else(|| concurrent_modification(id))?;

    let generated = match state.generator.generate_article(&topic.title, &prompt).await {
        Ok(generated) => generated,
        Err(e) => {
            // Revert edge: the topic falls back to its approved prompt.
            let reverted = TopicRepo::transition(
                &state.pool,
                id,
                TopicStatus::ArticleGenerating,
                TopicStatus::PromptApproved,
                &topic.artifacts(),
            )
            .await;
            if let Err(revert_err) = reverted {
                tracing::error!(topic_id = id, error = %revert_err, "Failed to revert after generation failure");
            }
            return Err(AppError::InternalError(format!(
                "article generation failed: {e}"
            )));
        }
    };

    let mut drafts = Vec::with_capacity(2);
    for (language, title, body) in [
        ("en", &generated.title_en, &generated.body_en),
        ("ar", &generated.title_ar, &generated.body_ar),
    ] {
        let draft = ContentRepo::upsert(
            &state.pool,
            &CreateContentDraft {
                topic_id: id,
                content_type_id: ContentType::Article.id(),
                language: language.to_string(),
                title: title.clone(),
                body: body.clone(),
            },
        )
        .await?;
        drafts.push(draft);
    }

    let updated = TopicRepo::transition(
        &state.pool,
        id,
        TopicStatus::ArticleGenerating,
        TopicStatus::ArticleReady,
        &topic.artifacts(),
    )
    .await?
    .ok_or_else(|| concurrent_modification(id))?;

    tracing::info!(
        user_id = auth.user_id,
        topic_id = id,
        "Article drafted in both languages"
    );

    Ok(Json(DataResponse {
        data: serde_json::json!({ "topic": updated, "drafts": drafts }),
    }))
}

/// POST /api/v1/topics/{id}/generate-linkedin
///
/// Draft the bilingual LinkedIn post bodies: `published` ->
/// `linkedin_ready`. There is no transient status here -- the generated
/// bodies land in the same write as the transition.
pub async fn generate_linkedin(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let topic = require_topic(&state, id).await?;
    let current = topic.status()?;
    if current != TopicStatus::Published {
        return Err(AppError::Core(CoreError::PreconditionFailed(format!(
            "topic {id} is {}, expected published",
            current.name()
        ))));
    }

    let article = topic.artifacts().article.unwrap_or_default();
    let url_en = article.url_en.ok_or_else(|| {
        AppError::Core(CoreError::PreconditionFailed(format!(
            "topic {id} has no published article URL"
        )))
    })?;
    let url_ar = article.url_ar.unwrap_or_else(|| url_en.clone());

    let post_en = state
        .generator
        .generate_post(&topic.title, &url_en)
        .await
        .map_err(|e| AppError::InternalError(format!("post generation failed: {e}")))?;
    // The generator returns both languages per call; use the per-language
    // URLs so each body links to its own edition.
    let post_ar = state
        .generator
        .generate_post(&topic.title, &url_ar)
        .await
        .map_err(|e| AppError::InternalError(format!("post generation failed: {e}")))?;

    let mut artifacts = topic.artifacts();
    artifacts.merge(TopicArtifacts {
        linkedin: Some(LinkedinArtifacts {
            post_body_en: Some(post_en.body_en),
            post_body_ar: Some(post_ar.body_ar),
            ..Default::default()
        }),
        ..Default::default()
    });

    let updated = TopicRepo::transition(
        &state.pool,
        id,
        current,
        TopicStatus::LinkedinReady,
        &artifacts,
    )
    .await?
    .ok_or_else(|| concurrent_modification(id))?;

    tracing::info!(user_id = auth.user_id, topic_id = id, "LinkedIn post drafted");
    Ok(Json(DataResponse { data: updated }))
}

fn concurrent_modification(id: DbId) -> AppError {
    AppError::Core(CoreError::PreconditionFailed(format!(
        "topic {id} was modified concurrently"
    )))
}
