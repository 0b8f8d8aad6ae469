use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::AssignmentHost;
use util::state::AppState;

use crate::{auth::AuthUser, response::ApiResponse, routes::common::service_error};

/// POST /classes/{class_id}/worksheets/{worksheet_id}/feedback
///
/// Body: a filled feedback template as plain text. Either every block is
/// applied or none is.
///
/// ### Responses
/// - `200 OK` with `{ "updated": n, "skipped": m }`
/// - `400 Bad Request` if no block is usable or a block names an assignment
///   outside this class and worksheet
pub async fn import_feedback(
    State(app_state): State<AppState>,
    Path((class_id, worksheet_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
    body: String,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    match host
        .import_feedback(&user.caller(), class_id, worksheet_id, &body)
        .await
    {
        Ok(summary) => {
            let message = format!("{} assignments updated", summary.updated);
            (StatusCode::OK, Json(ApiResponse::success(summary, message))).into_response()
        }
        Err(e) => service_error(e).into_response(),
    }
}
