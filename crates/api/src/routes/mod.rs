pub mod health;
pub mod schedule;
pub mod social;
pub mod topics;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /topics                                   create
/// /topics/{id}                              get
/// /topics/{id}/lock                         acquire advisory lock (POST)
/// /topics/{id}/unlock                       release advisory lock (POST)
/// /topics/{id}/transition                   approval-edge transition (POST)
/// /topics/{id}/generate-prompt              AI prompt draft (POST)
/// /topics/{id}/generate-article             AI article draft (POST)
/// /topics/{id}/publish-article              publish to the owned site (POST)
/// /topics/{id}/generate-linkedin            AI post draft (POST)
/// /topics/{id}/publish-linkedin             deliver to LinkedIn (POST)
///
/// /schedule                                 schedule a publish (POST)
/// /schedule/sweep                           execute due jobs (POST, secret header)
/// /schedule/{content_id}                    list (GET), cancel (DELETE)
///
/// /social/linkedin/connect                  OAuth initiate (GET, redirect)
/// /social/linkedin/callback                 OAuth callback (GET)
/// /social/linkedin/status                   derived credential metadata (GET)
/// /social/linkedin                          disconnect (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/topics", topics::router())
        .nest("/schedule", schedule::router())
        .nest("/social", social::router())
}
