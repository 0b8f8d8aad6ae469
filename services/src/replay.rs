//! Views of an assignment: the student's own embed and the teacher's replay.
//!
//! Both re-read the assignment before building anything, so a marker always
//! sees the latest committed snapshot. Neither path writes.

use crate::adapter::PersistenceAdapter;
use crate::error::ServiceError;
use crate::grading::QuizSubmission;
use crate::host::{AssignmentHost, Caller};
use db::models::assignment::{self, AssignmentStatus};
use db::models::worksheet;
use serde::Serialize;
use ::worksheet::{Embed, EmbedBuilder, ViewMode};

/// A quiz question as shown to a student. The answer key is not included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPrompt {
    pub question_text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReview {
    pub questions: Vec<ReviewedQuestion>,
    pub score: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StudentView {
    Worksheet {
        status: AssignmentStatus,
        embed: Embed,
    },
    Quiz {
        status: AssignmentStatus,
        prompts: Vec<QuizPrompt>,
        submitted: Option<QuizSubmission>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayView {
    Worksheet {
        assignment: assignment::Model,
        embed: Embed,
    },
    Quiz {
        assignment: assignment::Model,
        review: QuizReview,
    },
}

fn embed_for(ws: &worksheet::Model, a: &assignment::Model, mode: ViewMode) -> Embed {
    let assets = ws.asset_map();
    EmbedBuilder::new(ws.html_content.as_deref().unwrap_or_default())
        .assets(&assets)
        .saved_state(a.student_work.as_ref())
        .view_mode(mode)
        .build()
}

fn submission(a: &assignment::Model) -> Option<QuizSubmission> {
    a.student_work
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    /// The student's own view. Interactive while autosave is accepted,
    /// `submitted` afterwards.
    pub async fn student_view(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<StudentView, ServiceError> {
        let a = self.load_for_student(caller, assignment_id).await?;
        let ws = self.worksheet(a.worksheet_id).await?;

        if ws.is_quiz() {
            let prompts = ws
                .quiz_questions()
                .unwrap_or_default()
                .into_iter()
                .map(|q| QuizPrompt {
                    question_text: q.question_text,
                    options: q.options,
                })
                .collect();
            return Ok(StudentView::Quiz {
                status: a.status,
                submitted: submission(&a),
                prompts,
            });
        }

        let mode = if a.status.accepts_autosave() {
            ViewMode::Interactive
        } else {
            ViewMode::Submitted
        };
        Ok(StudentView::Worksheet {
            status: a.status,
            embed: embed_for(&ws, &a, mode),
        })
    }

    /// The marker's read-only replay of the latest saved work.
    pub async fn replay(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<ReplayView, ServiceError> {
        let a = self.load_for_teacher(caller, assignment_id).await?;
        let ws = self.worksheet(a.worksheet_id).await?;
        tracing::debug!(assignment_id, status = %a.status, "building replay");

        if ws.is_quiz() {
            let sub = submission(&a);
            let answers = sub.as_ref().map(|s| s.answers.as_slice()).unwrap_or_default();
            let questions = ws
                .quiz_questions()
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(i, q)| ReviewedQuestion {
                    question_text: q.question_text,
                    options: q.options,
                    correct_answer_index: q.correct_answer_index,
                    selected: answers.get(i).copied().flatten(),
                })
                .collect();
            let review = QuizReview {
                questions,
                score: sub.map(|s| s.score),
            };
            return Ok(ReplayView::Quiz { assignment: a, review });
        }

        let embed = embed_for(&ws, &a, ViewMode::ReadOnly);
        Ok(ReplayView::Worksheet { assignment: a, embed })
    }
}
