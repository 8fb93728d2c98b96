//! Route definitions for the `/schedule` resource.
//!
//! The sweep endpoint authenticates the periodic invoker via a shared
//! secret header instead of a user token; everything else requires
//! authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::schedule;
use crate::state::AppState;

/// Routes mounted at `/schedule`.
///
/// ```text
/// POST   /                 -> create_schedule
/// POST   /sweep            -> sweep (X-Sweep-Secret)
/// GET    /{content_id}     -> list_schedules
/// DELETE /{content_id}     -> cancel_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(schedule::create_schedule))
        .route("/sweep", post(schedule::sweep))
        .route(
            "/{content_id}",
            get(schedule::list_schedules).delete(schedule::cancel_schedule),
        )
}
