//! Worksheet definitions.
//!
//! An `html` worksheet carries author markup that is only ever rendered inside
//! the sandboxed embed, plus an optional asset map from relative file names to
//! hosted URLs. A `quiz` worksheet carries closed-form questions with their
//! answer key, which never leaves the trusted side.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "worksheets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub topic: Option<String>,
    pub kind: WorksheetKind,
    #[sea_orm(column_type = "Text", nullable)]
    pub html_content: Option<String>,
    pub file_map: Option<Json>,
    /// Contains the answer key; never serialize this to a student.
    #[serde(skip_serializing)]
    pub questions: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "worksheet_kind")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorksheetKind {
    #[sea_orm(string_value = "html")]
    Html,

    #[sea_orm(string_value = "quiz")]
    Quiz,
}

/// One closed-form question. `correct_answer_index` is the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create_html(
        db: &DbConn,
        title: &str,
        topic: Option<&str>,
        html: &str,
        file_map: &BTreeMap<String, String>,
    ) -> Result<Model, DbErr> {
        let file_map = if file_map.is_empty() {
            None
        } else {
            Some(serde_json::to_value(file_map).map_err(|e| DbErr::Custom(e.to_string()))?)
        };

        ActiveModel {
            title: Set(title.to_owned()),
            topic: Set(topic.map(str::to_owned)),
            kind: Set(WorksheetKind::Html),
            html_content: Set(Some(html.to_owned())),
            file_map: Set(file_map),
            questions: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn create_quiz(
        db: &DbConn,
        title: &str,
        topic: Option<&str>,
        questions: &[QuizQuestion],
    ) -> Result<Model, DbErr> {
        let questions =
            serde_json::to_value(questions).map_err(|e| DbErr::Custom(e.to_string()))?;

        ActiveModel {
            title: Set(title.to_owned()),
            topic: Set(topic.map(str::to_owned)),
            kind: Set(WorksheetKind::Quiz),
            html_content: Set(None),
            file_map: Set(None),
            questions: Set(Some(questions)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Relative asset name -> hosted URL. Missing or unreadable maps are empty.
    pub fn asset_map(&self) -> BTreeMap<String, String> {
        self.file_map
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Parsed quiz questions, or `None` when the stored value is missing or malformed.
    pub fn quiz_questions(&self) -> Option<Vec<QuizQuestion>> {
        self.questions
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn is_quiz(&self) -> bool {
        self.kind == WorksheetKind::Quiz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use serde_json::json;

    #[tokio::test]
    async fn html_worksheet_keeps_markup_and_assets() {
        let db = setup_test_db().await;
        let mut assets = BTreeMap::new();
        assets.insert("map.png".to_string(), "https://cdn.test/map.png".to_string());

        let ws = Model::create_html(&db, "Rivers", Some("Geography"), "<p>hi</p>", &assets)
            .await
            .unwrap();

        let fetched = Entity::find_by_id(ws.id).one(&db).await.unwrap().unwrap();
        assert_eq!(fetched.kind, WorksheetKind::Html);
        assert_eq!(fetched.html_content.as_deref(), Some("<p>hi</p>"));
        assert_eq!(fetched.asset_map(), assets);
        assert!(fetched.quiz_questions().is_none());
    }

    #[tokio::test]
    async fn quiz_questions_round_trip_in_camel_case() {
        let db = setup_test_db().await;
        let questions = vec![QuizQuestion {
            question_text: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_answer_index: 1,
        }];
        let ws = Model::create_quiz(&db, "Sums", None, &questions).await.unwrap();

        assert!(ws.is_quiz());
        assert_eq!(ws.quiz_questions().unwrap(), questions);
        assert_eq!(
            ws.questions.as_ref().unwrap()[0]["correctAnswerIndex"],
            json!(1)
        );
    }

    #[test]
    fn malformed_questions_read_as_none() {
        let ws = Model {
            id: 1,
            title: "Broken".into(),
            topic: None,
            kind: WorksheetKind::Quiz,
            html_content: None,
            file_map: None,
            questions: Some(json!({"not": "a list"})),
            created_at: Utc::now(),
        };
        assert!(ws.quiz_questions().is_none());
    }
}
