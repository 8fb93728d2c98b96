//! Editorial pipeline status enum and state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! the repository layer, the HTTP handlers, and the sweep worker alike.
//! Variant discriminants match the 1-based seed order of the
//! `topic_statuses` lookup table.

use crate::artifacts::{ArtifactPatch, TopicArtifacts};
use crate::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// A topic's position in the editorial pipeline.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicStatus {
    Pending = 1,
    PromptReady = 2,
    PromptApproved = 3,
    ArticleGenerating = 4,
    ArticleReady = 5,
    ArticleApproved = 6,
    Publishing = 7,
    Published = 8,
    LinkedinReady = 9,
    LinkedinApproved = 10,
    LinkedinPublished = 11,
}

impl TopicStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::PromptReady),
            3 => Some(Self::PromptApproved),
            4 => Some(Self::ArticleGenerating),
            5 => Some(Self::ArticleReady),
            6 => Some(Self::ArticleApproved),
            7 => Some(Self::Publishing),
            8 => Some(Self::Published),
            9 => Some(Self::LinkedinReady),
            10 => Some(Self::LinkedinApproved),
            11 => Some(Self::LinkedinPublished),
            _ => None,
        }
    }

    /// Human-readable name matching the lookup-table seed data.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PromptReady => "prompt_ready",
            Self::PromptApproved => "prompt_approved",
            Self::ArticleGenerating => "article_generating",
            Self::ArticleReady => "article_ready",
            Self::ArticleApproved => "article_approved",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::LinkedinReady => "linkedin_ready",
            Self::LinkedinApproved => "linkedin_approved",
            Self::LinkedinPublished => "linkedin_published",
        }
    }

    /// True for the transient states a long-running external call passes
    /// through. A topic must never be left in one of these across a crash;
    /// see [`TopicStatus::revert_target`].
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ArticleGenerating | Self::Publishing)
    }

    /// The last stable state a transient status falls back to on failure.
    pub fn revert_target(self) -> Option<Self> {
        match self {
            Self::ArticleGenerating => Some(Self::PromptApproved),
            Self::Publishing => Some(Self::ArticleApproved),
            _ => None,
        }
    }
}

impl From<TopicStatus> for StatusId {
    fn from(value: TopicStatus) -> Self {
        value as StatusId
    }
}

/// Returns the set of valid target statuses reachable from `from`.
///
/// The pipeline is monotonic along the forward edges; the only backward
/// edges are the explicit revert-on-failure transitions out of the two
/// transient states. `LinkedinPublished` is terminal.
pub fn valid_transitions(from: TopicStatus) -> &'static [TopicStatus] {
    use TopicStatus::*;
    match from {
        Pending => &[PromptReady],
        PromptReady => &[PromptApproved],
        PromptApproved => &[ArticleGenerating],
        // Revert edge: generation failure falls back to the approved prompt.
        ArticleGenerating => &[ArticleReady, PromptApproved],
        ArticleReady => &[ArticleApproved, Publishing],
        ArticleApproved => &[Publishing],
        // Revert edge: a partial publish falls back to the approved article.
        Publishing => &[Published, ArticleApproved],
        Published => &[LinkedinReady],
        LinkedinReady => &[LinkedinApproved, LinkedinPublished],
        LinkedinApproved => &[LinkedinPublished],
        LinkedinPublished => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
///
/// Self-loops and stage skips are rejected.
pub fn can_transition(from: TopicStatus, to: TopicStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, returning [`CoreError::InvalidTransition`]
/// for invalid ones.
pub fn validate_transition(from: TopicStatus, to: TopicStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.name(),
            to: to.name(),
        })
    }
}

/// The mutable pipeline state carried by a topic row: its status plus the
/// typed per-stage artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub status: TopicStatus,
    pub artifacts: TopicArtifacts,
}

impl PipelineState {
    pub fn new(status: TopicStatus, artifacts: TopicArtifacts) -> Self {
        Self { status, artifacts }
    }
}

/// Apply a requested transition to a pipeline state.
///
/// Fails with [`CoreError::InvalidTransition`] without touching the state.
/// On success the artifact patch is merged additively (a patch never clears
/// a field written by an earlier stage) and the status is advanced.
pub fn apply_transition(
    state: &mut PipelineState,
    requested: TopicStatus,
    patch: ArtifactPatch,
) -> Result<(), CoreError> {
    validate_transition(state.status, requested)?;
    state.artifacts.merge(patch);
    state.status = requested;
    Ok(())
}
