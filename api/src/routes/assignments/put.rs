use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use services::AssignmentHost;
use util::{format_validation_errors, state::AppState};
use validator::Validate;

use crate::{
    auth::{AuthUser, guards::Empty},
    response::ApiResponse,
    routes::common::service_error,
};

#[derive(Debug, Deserialize, Validate)]
pub struct MarkRequest {
    #[validate(length(max = 32, message = "Mark is too long"))]
    pub mark: Option<String>,
    #[validate(length(max = 10000, message = "Feedback is too long"))]
    pub feedback: Option<String>,
}

/// PUT /assignments/{assignment_id}/mark
///
/// Teacher of the class only. Replaces mark and feedback and completes the
/// assignment, from any status.
pub async fn put_mark(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<MarkRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Empty>::error(format_validation_errors(&e))),
        )
            .into_response();
    }

    let host = AssignmentHost::from_state(&app_state);
    match host
        .record_mark(
            &user.caller(),
            assignment_id,
            req.mark.as_deref(),
            req.feedback.as_deref(),
        )
        .await
    {
        Ok(assignment) => (
            StatusCode::OK,
            Json(ApiResponse::success(assignment, "Mark recorded")),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
