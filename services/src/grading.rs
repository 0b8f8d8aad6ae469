//! Trusted grading of closed-form quizzes.
//!
//! The client only sends selected option indices. Scoring happens here against
//! the stored answer key, and the graded submission, mark and feedback are
//! written in one statement.

use crate::adapter::PersistenceAdapter;
use crate::error::ServiceError;
use crate::host::{AssignmentHost, Caller};
use db::models::assignment::AssignmentStatus;
use db::models::worksheet::QuizQuestion;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const AUTO_GRADED_FEEDBACK: &str = "This quiz was automatically graded.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizGrade {
    /// `"{correct} / {total}"`.
    pub score: String,
    pub total_marks: usize,
}

/// Stored as `student_work` for quiz assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<Option<usize>>,
    pub score: String,
}

/// Pads or truncates `answers` to one entry per question.
pub fn normalize_answers(mut answers: Vec<Option<usize>>, questions: usize) -> Vec<Option<usize>> {
    answers.resize(questions, None);
    answers
}

pub fn score(questions: &[QuizQuestion], answers: &[Option<usize>]) -> usize {
    questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| **a == Some(q.correct_answer_index))
        .count()
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    pub async fn submit_quiz(
        &self,
        caller: &Caller,
        assignment_id: i64,
        answers: Vec<Option<usize>>,
    ) -> Result<QuizGrade, ServiceError> {
        let assignment = self.load_for_student(caller, assignment_id).await?;
        if assignment.status == AssignmentStatus::Completed {
            return Err(ServiceError::precondition("This quiz has already been graded"));
        }

        let worksheet = self.worksheet(assignment.worksheet_id).await?;
        let questions = match worksheet.quiz_questions() {
            Some(q) if worksheet.is_quiz() && !q.is_empty() => q,
            _ => {
                tracing::warn!(
                    assignment_id,
                    worksheet_id = worksheet.id,
                    "quiz submission against a worksheet that is not a valid quiz"
                );
                return Err(ServiceError::precondition(
                    "This worksheet is not a valid, non-empty quiz",
                ));
            }
        };

        let answers = normalize_answers(answers, questions.len());
        let correct = score(&questions, &answers);
        let grade = QuizGrade {
            score: format!("{correct} / {}", questions.len()),
            total_marks: questions.len(),
        };

        let submission = serde_json::to_value(QuizSubmission {
            answers,
            score: grade.score.clone(),
        })
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

        if !self
            .store
            .record_quiz(assignment_id, &submission, &grade.score, AUTO_GRADED_FEEDBACK)
            .await?
        {
            return Err(ServiceError::precondition("This quiz has already been graded"));
        }

        tracing::info!(assignment_id, score = %grade.score, "quiz graded");
        self.notify(
            assignment_id,
            "marked",
            &json!({
                "assignment_id": assignment_id,
                "status": AssignmentStatus::Completed,
                "mark": grade.score
            }),
        )
        .await;
        Ok(grade)
    }
}
