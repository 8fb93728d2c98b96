//! Handlers for the LinkedIn connection flow and status.
//!
//! The connect/callback pair is the CSRF-guarded three-step dance: a
//! random state token is bound to a short-lived HttpOnly cookie on
//! `connect`, verified exactly once on `callback`, and discarded.

use axum::extract::{Query, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use pressroom_core::crypto::state_token;
use pressroom_core::error::CoreError;
use pressroom_core::types::DbId;
use pressroom_social::oauth::{STATE_COOKIE, STATE_COOKIE_MAX_AGE_SECS};
use pressroom_social::publisher::ConnectError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/social/linkedin/connect
///
/// Start the OAuth dance: bind a fresh state token to a short-lived
/// cookie and redirect to the LinkedIn consent screen.
pub async fn connect(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let token = state_token();
    let url = state.social.authorize_url(&token);

    // The callback arrives as a bare browser redirect without the
    // Authorization header, so the cookie also carries who is connecting.
    let cookie = format!(
        "{STATE_COOKIE}={token}.{}; Max-Age={STATE_COOKIE_MAX_AGE_SECS}; \
         Path=/api/v1/social/linkedin; HttpOnly; SameSite=Lax",
        auth.user_id
    );

    tracing::info!(user_id = auth.user_id, "LinkedIn connect initiated");

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, url),
            (SET_COOKIE, cookie),
        ],
    ))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /api/v1/social/linkedin/callback
///
/// Finish the OAuth dance: verify the state against the cookie, discard
/// it, and exchange the code for sealed, stored tokens.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Some(error) = query.error {
        let detail = query.error_description.unwrap_or_default();
        return Err(AppError::BadRequest(format!(
            "LinkedIn authorization was refused: {error} {detail}"
        )));
    }

    let (expected_state, user_id) = read_state_cookie(&headers)?;
    let presented = query.state.as_deref().unwrap_or_default();
    if presented.is_empty() || presented != expected_state {
        return Err(AppError::Core(CoreError::Forbidden(
            "OAuth state mismatch".into(),
        )));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("missing authorization code".into()))?;

    let status = state
        .social
        .complete_connection(&state.pool, user_id, &code)
        .await
        .map_err(|e| match e {
            ConnectError::LinkedIn(err) => {
                AppError::BadRequest(format!("LinkedIn connection failed: {err}"))
            }
            other => AppError::InternalError(other.to_string()),
        })?;

    // The state token is single-use: expire the cookie with the response.
    let clear = format!(
        "{STATE_COOKIE}=; Max-Age=0; Path=/api/v1/social/linkedin; HttpOnly; SameSite=Lax"
    );

    Ok((
        [(SET_COOKIE, clear)],
        Json(DataResponse { data: status }),
    ))
}

/// GET /api/v1/social/linkedin/status
///
/// Derived connection metadata only -- token material never leaves the
/// server.
pub async fn status(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = state
        .social
        .connection_status(&state.pool, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /api/v1/social/linkedin
///
/// Remove the stored credential.
pub async fn disconnect(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let disconnected = state.social.disconnect(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, disconnected, "LinkedIn disconnect requested");
    Ok(Json(DataResponse {
        data: json!({ "disconnected": disconnected }),
    }))
}

/// Parse `(state_token, user_id)` out of the state cookie.
fn read_state_cookie(headers: &HeaderMap) -> Result<(String, DbId), AppError> {
    let cookie_header = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(state_cookie_error)?;

    let prefix = format!("{STATE_COOKIE}=");
    let value = cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .ok_or_else(state_cookie_error)?;

    let (token, user_id) = value.rsplit_once('.').ok_or_else(state_cookie_error)?;
    let user_id: DbId = user_id.parse().map_err(|_| state_cookie_error())?;
    if token.is_empty() {
        return Err(state_cookie_error());
    }
    Ok((token.to_string(), user_id))
}

fn state_cookie_error() -> AppError {
    AppError::Core(CoreError::Forbidden(
        "OAuth state cookie missing or malformed".into(),
    ))
}
