use crate::response::ApiResponse;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use util::{config, state::AppState};

#[derive(Debug, Serialize)]
pub struct Health {
    pub service: String,
    pub version: &'static str,
    pub env: String,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// Liveness only; does not touch the database.
async fn health_check() -> impl IntoResponse {
    let health = Health {
        service: config::project_name(),
        version: env!("CARGO_PKG_VERSION"),
        env: config::env(),
    };
    Json(ApiResponse::success(health, "Service is up"))
}

#[cfg(test)]
mod tests {
    use super::health_check;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use serde_json::Value;

    #[tokio::test]
    async fn reports_service_and_version() {
        let response = health_check().await.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["data"]["service"].is_string());
    }
}
