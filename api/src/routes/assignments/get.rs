use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::AssignmentHost;
use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse, routes::common::service_error};

/// GET /assignments/{assignment_id}
///
/// Visible to the owning student and to the teacher of the assignment's class.
pub async fn get_assignment(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.get_assignment(&user.caller(), assignment_id).await {
        Ok(assignment) => (
            StatusCode::OK,
            Json(ApiResponse::success(assignment, "Assignment retrieved")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

/// GET /assignments/{assignment_id}/embed
///
/// For `html` worksheets returns
/// `{ kind: "worksheet", status, embed: { srcdoc, sandbox, viewMode } }`.
/// The view mode is `interactive` until the work is handed in, `submitted` after.
/// For quizzes returns the prompts without the answer key.
pub async fn get_embed(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.student_view(&user.caller(), assignment_id).await {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::success(view, "Worksheet ready")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

/// GET /assignments/{assignment_id}/replay
///
/// Teacher-only. Re-reads the assignment and returns a `read_only` embed of
/// the latest saved work, or the reviewed quiz.
pub async fn get_replay(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.replay(&user.caller(), assignment_id).await {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::success(view, "Replay ready")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
