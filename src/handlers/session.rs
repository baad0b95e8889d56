use crate::core::state::AppState;
use crate::models::response::SuccessResponse;
use crate::pipeline::credential::{expired_session_cookies, Session};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

/// POST /session/logout
///
/// Drops the session's cached assignment ids and open views, and expires the
/// `token` and `user_id` cookies.
pub async fn logout_handler(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let scope = session.scope;

    state.assignment_cache.clear(&scope);
    let closed_views = state.views.close_scope(&scope);

    info!(scope = %scope, closed_views = closed_views, "Session ended");

    let [token, user_id] = expired_session_cookies();
    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, token), (header::SET_COOKIE, user_id)]),
        Json(SuccessResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}
