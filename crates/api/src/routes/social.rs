//! Route definitions for the `/social` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::social;
use crate::state::AppState;

/// Routes mounted at `/social`.
///
/// ```text
/// GET    /linkedin/connect    -> connect (redirect to consent screen)
/// GET    /linkedin/callback   -> callback (state-verified)
/// GET    /linkedin/status     -> status
/// DELETE /linkedin            -> disconnect
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/linkedin/connect", get(social::connect))
        .route("/linkedin/callback", get(social::callback))
        .route("/linkedin/status", get(social::status))
        .route("/linkedin", delete(social::disconnect))
}
