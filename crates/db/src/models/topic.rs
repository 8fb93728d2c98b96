//! Topic entity models and DTOs.

use pressroom_core::artifacts::{
    ArticleArtifacts, LinkedinArtifacts, PromptArtifacts, TopicArtifacts,
};
use pressroom_core::error::CoreError;
use pressroom_core::pipeline::{PipelineState, TopicStatus};
use pressroom_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use super::status::StatusId;

/// A row from the `topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub source_id: StatusId,
    pub keywords: Json<Vec<String>>,
    pub priority: i32,
    /// Advisory edit lock. Reduces, but does not enforce, concurrent
    /// workflow advancement; the conditional status update is the real
    /// guard.
    pub locked: bool,
    pub locked_by: Option<DbId>,
    pub locked_at: Option<Timestamp>,
    pub status_id: StatusId,
    pub prompt_artifacts: Option<Json<PromptArtifacts>>,
    pub article_artifacts: Option<Json<ArticleArtifacts>>,
    pub linkedin_artifacts: Option<Json<LinkedinArtifacts>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Topic {
    /// Decode the pipeline status, failing on an unknown ID.
    pub fn status(&self) -> Result<TopicStatus, CoreError> {
        TopicStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "topic {} has unknown status id {}",
                self.id, self.status_id
            ))
        })
    }

    /// Assemble the typed artifact set from the three JSONB columns.
    pub fn artifacts(&self) -> TopicArtifacts {
        TopicArtifacts {
            prompt: self.prompt_artifacts.as_ref().map(|j| j.0.clone()),
            article: self.article_artifacts.as_ref().map(|j| j.0.clone()),
            linkedin: self.linkedin_artifacts.as_ref().map(|j| j.0.clone()),
        }
    }

    /// Status plus artifacts, as consumed by the core state machine.
    pub fn pipeline_state(&self) -> Result<PipelineState, CoreError> {
        Ok(PipelineState::new(self.status()?, self.artifacts()))
    }
}

/// DTO for creating a topic via `POST /api/v1/topics`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopic {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub description: Option<String>,
    /// Source lookup id (manual=1, rss=2, ai_suggested=3). Defaults to manual.
    pub source_id: Option<StatusId>,
    pub keywords: Option<Vec<String>>,
    pub priority: Option<i32>,
}

/// DTO for an explicit stage transition via `POST /topics/{id}/transition`.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status id per the pipeline adjacency list.
    pub status_id: StatusId,
}
