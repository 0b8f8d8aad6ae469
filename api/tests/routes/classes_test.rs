use crate::helpers::{TestApp, make_test_app};
use axum::{
    body::{Body, to_bytes},
    http::{StatusCode, header},
};
use db::models::assignment::{self, AssignmentStatus};
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use serial_test::serial;

fn base(app: &TestApp) -> String {
    format!(
        "/api/classes/{}/worksheets/{}",
        app.seed.class.id, app.seed.worksheet.id
    )
}

async fn download(app: &TestApp, path: &str, token: &str) -> (StatusCode, String, String) {
    let response = app
        .request("GET", path, Some(token), Body::empty(), "text/plain")
        .await;
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, disposition, String::from_utf8(body.to_vec()).unwrap())
}

async fn import(app: &TestApp, content: String) -> (StatusCode, Value) {
    let response = app
        .request(
            "POST",
            &format!("{}/feedback", base(app)),
            Some(&app.teacher_token()),
            Body::from(content),
            "text/plain",
        )
        .await;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn filled_block(assignment_id: i64, grade: &str, feedback: &str) -> String {
    format!(
        "[START STUDENT]\nStudent: someone\nAssignment ID: {assignment_id}\n---\nGrade: {grade}\nFeedback:\n{feedback}\n[END STUDENT]\n\n"
    )
}

#[tokio::test]
#[serial]
async fn answers_export_lists_written_answers() {
    let app = make_test_app().await;
    app.json(
        "POST",
        &format!("/api/assignments/{}/messages", app.seed.assignment.id),
        Some(&app.student_token()),
        Some(json!({
            "type": "SAVE_WORKSHEET_DATA",
            "payload": { "inputs": { "q1": "Random Access Memory" } }
        })),
    )
    .await;

    let (status, disposition, body) = download(
        &app,
        &format!("{}/answers", base(&app)),
        &app.teacher_token(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        disposition,
        "attachment; filename=\"10B_Computer_Science-Computer_Systems_Answers.txt\""
    );
    assert!(body.starts_with("Worksheet: Computer Systems\nClass: 10B Computer Science\n"));
    assert!(body.contains("Student: thabo"));
    assert!(body.contains("Question: What does RAM stand for?"));
    assert!(body.contains("Mark Scheme: Random Access Memory"));
    assert!(body.contains("Answer: Random Access Memory"));
    assert!(body.contains("No written answers submitted."));
}

#[tokio::test]
#[serial]
async fn students_cannot_download_class_exports() {
    let app = make_test_app().await;
    let (status, _, _) = download(
        &app,
        &format!("{}/feedback-template", base(&app)),
        &app.student_token(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn template_round_trips_through_import() {
    let app = make_test_app().await;
    let (status, disposition, template) = download(
        &app,
        &format!("{}/feedback-template", base(&app)),
        &app.teacher_token(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.ends_with("_Feedback_Template.txt\""));
    assert_eq!(template.matches("Grade: \nFeedback:\n").count(), 2);

    let filled = template.replacen(
        "Grade: \nFeedback:\n",
        "Grade: G\nFeedback:\nClear definitions.\n",
        1,
    );
    let (status, json) = import(&app, filled).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["updated"], 1);
    assert_eq!(json["data"]["skipped"], 1);
    assert_eq!(json["message"], "1 assignments updated");

    let marked = assignment::Entity::find_by_id(app.seed.assignment.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(marked.status, AssignmentStatus::Completed);
    assert_eq!(marked.mark.as_deref(), Some("G"));
    assert_eq!(marked.feedback.as_deref(), Some("Clear definitions."));
}

#[tokio::test]
#[serial]
async fn import_is_all_or_nothing() {
    let app = make_test_app().await;
    let content = format!(
        "{}{}",
        filled_block(app.seed.assignment.id, "E", "Excellent."),
        filled_block(app.seed.quiz_assignment.id, "U", "Wrong worksheet."),
    );

    let (status, json) = import(&app, content).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let untouched = assignment::Entity::find_by_id(app.seed.assignment.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, AssignmentStatus::NotStarted);
    assert!(untouched.mark.is_none());
}

#[tokio::test]
#[serial]
async fn import_without_usable_blocks_is_rejected() {
    let app = make_test_app().await;
    let (status, _) = import(&app, "Worksheet: Computer Systems\n".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn grades_vocabulary() {
    let app = make_test_app().await;
    let (status, json) = app
        .json("GET", "/api/classes/grades", Some(&app.teacher_token()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!(["O", "E", "G", "RI", "U"]));
}
