use crate::helpers::{TestApp, make_test_app};
use axum::{body::Body, http::StatusCode};
use db::models::assignment::{self, AssignmentStatus};
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use serial_test::serial;
use util::config::AppConfig;

fn save_message(answer: &str) -> Value {
    json!({
        "type": "SAVE_WORKSHEET_DATA",
        "payload": {
            "inputs": { "q1": answer },
            "interactiveStates": { "match-parts": { "matched": ["cpu"] } }
        }
    })
}

fn uri(id: i64, tail: &str) -> String {
    format!("/api/assignments/{id}{tail}")
}

async fn stored(app: &TestApp, id: i64) -> assignment::Model {
    assignment::Entity::find_by_id(id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
#[serial]
async fn student_saves_then_hands_in_and_further_saves_conflict() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let token = app.student_token();

    let (status, json) = app
        .json("POST", &uri(id, "/messages"), Some(&token), Some(save_message("RAM")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], "saved");
    assert_eq!(json["data"]["status"], "in_progress");

    let a = stored(&app, id).await;
    assert_eq!(a.status, AssignmentStatus::InProgress);
    assert_eq!(a.student_work.unwrap()["inputs"]["q1"], "RAM");

    let (status, json) = app.json("POST", &uri(id, "/hand-in"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "handed_in");

    let (status, json) = app
        .json("POST", &uri(id, "/messages"), Some(&token), Some(save_message("ROM")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);

    let a = stored(&app, id).await;
    assert_eq!(a.student_work.unwrap()["inputs"]["q1"], "RAM");

    let (status, _) = app.json("POST", &uri(id, "/hand-in"), Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn embed_is_interactive_until_handed_in() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let token = app.student_token();

    let (status, json) = app.json("GET", &uri(id, "/embed"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["kind"], "worksheet");
    assert_eq!(json["data"]["embed"]["viewMode"], "interactive");
    let srcdoc = json["data"]["embed"]["srcdoc"].as_str().unwrap();
    assert!(srcdoc.contains("https://cdn.test/ws/style.css"));

    app.json("POST", &uri(id, "/hand-in"), Some(&token), None).await;

    let (_, json) = app.json("GET", &uri(id, "/embed"), Some(&token), None).await;
    assert_eq!(json["data"]["embed"]["viewMode"], "submitted");
    assert_eq!(json["data"]["status"], "handed_in");
}

#[tokio::test]
#[serial]
async fn another_student_is_forbidden() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let intruder = app.other_student_token();

    let (status, _) = app.json("GET", &uri(id, ""), Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json("POST", &uri(id, "/messages"), Some(&intruder), Some(save_message("x")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(stored(&app, id).await.student_work.is_none());
}

#[tokio::test]
#[serial]
async fn malformed_and_foreign_messages() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let token = app.student_token();

    let response = app
        .request(
            "POST",
            &uri(id, "/messages"),
            Some(&token),
            Body::from("{not json"),
            "application/json",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            &uri(id, "/messages"),
            Some(&token),
            Some(json!({ "type": "SAVE_WORKSHEET_DATA", "payload": "oops" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .json(
            "POST",
            &uri(id, "/messages"),
            Some(&token),
            Some(json!({ "type": "RESIZE", "payload": { "height": 900 } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["result"], "ignored");

    let a = stored(&app, id).await;
    assert_eq!(a.status, AssignmentStatus::NotStarted);
    assert!(a.student_work.is_none());
}

#[tokio::test]
#[serial]
async fn oversized_messages_are_rejected() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    AppConfig::set_max_snapshot_bytes(64);

    let (status, _) = app
        .json(
            "POST",
            &uri(id, "/messages"),
            Some(&app.student_token()),
            Some(save_message(&"a".repeat(200))),
        )
        .await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(stored(&app, id).await.student_work.is_none());
}

#[tokio::test]
#[serial]
async fn quiz_is_graded_once() {
    let app = make_test_app().await;
    let id = app.seed.quiz_assignment.id;
    let token = app.student_token();

    let (status, json) = app.json("GET", &uri(id, "/embed"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["kind"], "quiz");
    assert_eq!(json["data"]["prompts"].as_array().unwrap().len(), 3);
    assert!(json["data"]["prompts"][0].get("correctAnswerIndex").is_none());

    let (status, json) = app
        .json("POST", &uri(id, "/quiz"), Some(&token), Some(json!({ "answers": [1, null, 0] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["score"], "2 / 3");
    assert_eq!(json["data"]["totalMarks"], 3);

    let (status, _) = app
        .json("POST", &uri(id, "/quiz"), Some(&token), Some(json!({ "answers": [1, 1, 0] })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let a = stored(&app, id).await;
    assert_eq!(a.status, AssignmentStatus::Completed);
    assert_eq!(a.mark.as_deref(), Some("2 / 3"));
}

#[tokio::test]
#[serial]
async fn quiz_endpoint_refuses_worksheets() {
    let app = make_test_app().await;
    let (status, _) = app
        .json(
            "POST",
            &uri(app.seed.assignment.id, "/quiz"),
            Some(&app.student_token()),
            Some(json!({ "answers": [0] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn quiz_refuses_autosave_messages() {
    let app = make_test_app().await;
    let id = app.seed.quiz_assignment.id;
    let (status, _) = app
        .json(
            "POST",
            &uri(id, "/messages"),
            Some(&app.student_token()),
            Some(save_message("RAM")),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let a = stored(&app, id).await;
    assert_eq!(a.status, AssignmentStatus::NotStarted);
    assert!(a.student_work.is_none());
}

#[tokio::test]
#[serial]
async fn teacher_replays_read_only_and_marks() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let student = app.student_token();
    let teacher = app.teacher_token();

    app.json(
        "POST",
        &uri(id, "/messages"),
        Some(&student),
        Some(save_message("volatile main memory")),
    )
    .await;

    let (status, _) = app.json("GET", &uri(id, "/replay"), Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app.json("GET", &uri(id, "/replay"), Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["kind"], "worksheet");
    assert_eq!(json["data"]["embed"]["viewMode"], "read_only");
    assert!(json["data"]["embed"]["srcdoc"].as_str().unwrap().contains("volatile main memory"));

    let (status, _) = app
        .json("PUT", &uri(id, "/mark"), Some(&student), Some(json!({ "mark": "10/10" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(
            "PUT",
            &uri(id, "/mark"),
            Some(&teacher),
            Some(json!({ "mark": "  ", "feedback": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .json(
            "PUT",
            &uri(id, "/mark"),
            Some(&teacher),
            Some(json!({ "mark": "8/10", "feedback": "Good use of terms." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["mark"], "8/10");

    let (status, _) = app
        .json("POST", &uri(id, "/messages"), Some(&student), Some(save_message("ROM")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn unknown_assignment_is_not_found() {
    let app = make_test_app().await;
    let (status, _) = app
        .json("GET", &uri(9999, ""), Some(&app.teacher_token()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
