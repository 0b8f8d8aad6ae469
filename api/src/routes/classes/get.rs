use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::{AssignmentHost, GRADES};
use util::state::AppState;

use crate::{
    auth::AuthUser,
    response::ApiResponse,
    routes::common::{service_error, text_download},
};

/// GET /classes/{class_id}/worksheets/{worksheet_id}/answers
///
/// Downloads every student's written answers with question text and mark scheme.
pub async fn get_answers(
    State(app_state): State<AppState>,
    Path((class_id, worksheet_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.export_answers(&user.caller(), class_id, worksheet_id).await {
        Ok(export) => text_download(export),
        Err(e) => service_error(e).into_response(),
    }
}

/// GET /classes/{class_id}/worksheets/{worksheet_id}/feedback-template
pub async fn get_feedback_template(
    State(app_state): State<AppState>,
    Path((class_id, worksheet_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host.feedback_template(&user.caller(), class_id, worksheet_id).await {
        Ok(export) => text_download(export),
        Err(e) => service_error(e).into_response(),
    }
}

/// GET /classes/grades
pub async fn get_grades() -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(GRADES, "Grades retrieved")),
    )
        .into_response()
}
