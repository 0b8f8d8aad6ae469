use api::auth::generate_jwt;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use db::models::{
    assignment, class,
    user::{self, UserRole},
    worksheet::{self as worksheet_model, QuizQuestion},
};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::collections::BTreeMap;
use tower::ServiceExt;
use util::{state::AppState, ws::WebSocketManager};

pub const MARKUP: &str = r#"<!DOCTYPE html>
<html><head><title>Computer Systems</title><link href="style.css" rel="stylesheet"></head>
<body>
  <section id="intro" data-section>
    <div class="task-container" id="Question1">
      <h4>Question 1</h4>
      <p>What does RAM stand for?</p>
      <div class="mark-scheme">Mark Scheme: Random Access Memory</div>
      <textarea id="q1"></textarea>
    </div>
  </section>
  <section id="tasks" data-section>
    <div id="match-parts" data-task="match_pairs">
      <span data-pair="cpu">CPU</span><span data-pair="ram">RAM</span>
    </div>
  </section>
</body></html>"#;

pub struct Seed {
    pub teacher: user::Model,
    pub student: user::Model,
    pub other_student: user::Model,
    pub class: class::Model,
    pub worksheet: worksheet_model::Model,
    pub assignment: assignment::Model,
    pub other_assignment: assignment::Model,
    pub quiz_assignment: assignment::Model,
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub seed: Seed,
}

impl TestApp {
    pub fn db(&self) -> &DatabaseConnection {
        self.state.db()
    }

    pub fn teacher_token(&self) -> String {
        token(&self.seed.teacher)
    }

    pub fn student_token(&self) -> String {
        token(&self.seed.student)
    }

    pub fn other_student_token(&self) -> String {
        token(&self.seed.other_student)
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Body,
        content_type: &str,
    ) -> Response {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.app
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Sends a JSON (or empty) request and decodes the JSON response.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = self
            .request(method, uri, token, body, "application/json")
            .await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

pub fn token(user: &user::Model) -> String {
    generate_jwt(user.id, user.role).unwrap().0
}

async fn seed(db: &DatabaseConnection) -> Seed {
    let teacher = user::Model::create(db, "ms_naidoo", UserRole::Teacher).await.unwrap();
    let student = user::Model::create(db, "thabo", UserRole::Student).await.unwrap();
    let other_student = user::Model::create(db, "lerato", UserRole::Student).await.unwrap();
    let class = class::Model::create(db, "10B Computer Science", teacher.id).await.unwrap();

    let mut assets = BTreeMap::new();
    assets.insert("style.css".to_string(), "https://cdn.test/ws/style.css".to_string());
    let worksheet = worksheet_model::Model::create_html(
        db,
        "Computer Systems",
        Some("Hardware"),
        MARKUP,
        &assets,
    )
    .await
    .unwrap();
    let quiz = worksheet_model::Model::create_quiz(
        db,
        "Revision Quiz",
        None,
        &[
            QuizQuestion {
                question_text: "Which is volatile?".into(),
                options: vec!["SSD".into(), "RAM".into()],
                correct_answer_index: 1,
            },
            QuizQuestion {
                question_text: "Bits in a byte?".into(),
                options: vec!["4".into(), "8".into()],
                correct_answer_index: 1,
            },
            QuizQuestion {
                question_text: "Brain of the computer?".into(),
                options: vec!["CPU".into(), "GPU".into()],
                correct_answer_index: 0,
            },
        ],
    )
    .await
    .unwrap();

    let assignment = assignment::Model::create(db, class.id, worksheet.id, student.id)
        .await
        .unwrap();
    let other_assignment = assignment::Model::create(db, class.id, worksheet.id, other_student.id)
        .await
        .unwrap();
    let quiz_assignment = assignment::Model::create(db, class.id, quiz.id, student.id)
        .await
        .unwrap();

    Seed {
        teacher,
        student,
        other_student,
        class,
        worksheet,
        assignment,
        other_assignment,
        quiz_assignment,
    }
}

pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let seed = seed(&db).await;
    let state = AppState::new(db, WebSocketManager::new());
    TestApp {
        app: api::app(state.clone()),
        state,
        seed,
    }
}
