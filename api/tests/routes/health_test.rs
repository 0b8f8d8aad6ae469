use crate::helpers::make_test_app;
use axum::http::StatusCode;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn health_is_public() {
    let app = make_test_app().await;
    let (status, json) = app.json("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
#[serial]
async fn assignment_routes_require_a_token() {
    let app = make_test_app().await;
    let uri = format!("/api/assignments/{}", app.seed.assignment.id);

    let (status, json) = app.json("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);

    let (status, _) = app.json("GET", &uri, Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
