use pressroom_core::error::CoreError;

/// Error type for pipeline operations.
///
/// Wraps [`CoreError`] for domain failures and `sqlx::Error` for storage
/// failures; the API layer maps both onto HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
