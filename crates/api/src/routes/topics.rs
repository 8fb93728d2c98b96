//! Route definitions for the `/topics` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, publish, topic};
use crate::state::AppState;

/// Routes mounted at `/topics`.
///
/// ```text
/// POST   /                           -> create_topic
/// GET    /{id}                       -> get_topic
/// POST   /{id}/lock                  -> lock_topic
/// POST   /{id}/unlock                -> unlock_topic
/// POST   /{id}/transition            -> transition_topic
/// POST   /{id}/generate-prompt       -> generate_prompt
/// POST   /{id}/generate-article      -> generate_article
/// POST   /{id}/publish-article       -> publish_article
/// POST   /{id}/generate-linkedin     -> generate_linkedin
/// POST   /{id}/publish-linkedin      -> publish_linkedin
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(topic::create_topic))
        .route("/{id}", get(topic::get_topic))
        .route("/{id}/lock", post(topic::lock_topic))
        .route("/{id}/unlock", post(topic::unlock_topic))
        .route("/{id}/transition", post(topic::transition_topic))
        .route("/{id}/generate-prompt", post(generation::generate_prompt))
        .route("/{id}/generate-article", post(generation::generate_article))
        .route("/{id}/publish-article", post(publish::publish_article))
        .route("/{id}/generate-linkedin", post(generation::generate_linkedin))
        .route("/{id}/publish-linkedin", post(publish::publish_linkedin))
}
