use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use services::{ServiceError, TextExport};
use worksheet::BoundaryError;

/// Maps a host error onto the API's error envelope.
pub fn service_error(err: ServiceError) -> (StatusCode, Json<ApiResponse<Empty>>) {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ServiceError::Frozen => StatusCode::CONFLICT,
        ServiceError::Precondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Malformed(BoundaryError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        ServiceError::Malformed(_) | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Internal(_) | ServiceError::Database(_) => {
            tracing::error!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = match status {
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
        _ => err.to_string(),
    };
    (status, Json(ApiResponse::error(message)))
}

/// A plain-text download with a `Content-Disposition` file name.
pub fn text_download(export: TextExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.file_name.replace('"', ""));
    let mut response = (StatusCode::OK, export.content).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
