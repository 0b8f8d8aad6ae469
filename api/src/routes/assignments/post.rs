use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use db::models::assignment::AssignmentStatus;
use serde::{Deserialize, Serialize};
use services::AssignmentHost;
use util::{format_validation_errors, state::AppState};
use validator::Validate;

use crate::{
    auth::{AuthUser, guards::Empty},
    response::ApiResponse,
    routes::common::service_error,
};

/// POST /assignments/{assignment_id}/messages
///
/// Body: a raw worksheet message, e.g.
/// `{ "type": "SAVE_WORKSHEET_DATA", "payload": { "inputs": {...}, "interactiveStates": {...} } }`.
///
/// ### Responses
/// - `200 OK` with `{ "result": "saved", "status": "in_progress" }`
///   or `{ "result": "ignored", "kind": ... }`
/// - `400 Bad Request` for malformed messages, `413` when over the size limit
/// - `403 Forbidden` when the caller does not own the assignment
/// - `409 Conflict` once the assignment has been handed in
/// - `422 Unprocessable Entity` for quiz assignments, which are graded instead
pub async fn post_message(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.receive_message(&user.caller(), assignment_id, &body).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(ApiResponse::success(receipt, "Message received")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct HandInResponse {
    pub status: AssignmentStatus,
}

/// POST /assignments/{assignment_id}/hand-in
pub async fn hand_in(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.hand_in(&user.caller(), assignment_id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                HandInResponse { status },
                "Assignment handed in",
            )),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(max = 500, message = "Too many answers"))]
    pub answers: Vec<Option<usize>>,
}

/// POST /assignments/{assignment_id}/quiz
///
/// Body: `{ "answers": [1, null, 0] }`. Graded against the stored key.
///
/// ### Responses
/// - `200 OK` with `{ "score": "2 / 3", "totalMarks": 3 }`
/// - `422 Unprocessable Entity` if already graded or the worksheet is not a quiz
pub async fn submit_quiz(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<QuizRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Empty>::error(format_validation_errors(&e))),
        )
            .into_response();
    }

    let host = AssignmentHost::from_state(&app_state);
    match host.submit_quiz(&user.caller(), assignment_id, req.answers).await {
        Ok(grade) => (
            StatusCode::OK,
            Json(ApiResponse::success(grade, "Quiz graded")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
