//! Plain-text bulk marking for a class: export every student's written
//! answers, hand out a blank feedback template, and import a filled template.
//!
//! Block format, one per assignment:
//!
//! ```text
//! ========================================
//! [START STUDENT]
//! Student: thabo
//! Assignment ID: 12
//! ---
//! Grade: G
//! Feedback:
//! Well argued.
//! [END STUDENT]
//! ```

use crate::adapter::PersistenceAdapter;
use crate::error::ServiceError;
use crate::host::{AssignmentHost, Caller};
use chrono::Utc;
use db::models::assignment::{self, AssignmentStatus};
use db::models::{class, user};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

/// Grade vocabulary offered by marking UIs. Import accepts any single token.
pub const GRADES: [&str; 5] = ["O", "E", "G", "RI", "U"];

const RULE: &str = "========================================";
const START: &str = "[START STUDENT]";
const END: &str = "[END STUDENT]";

static QUESTION_CONTAINER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div.task-container, div[id^="Question"]"#).expect("valid selector")
});
static TEXTAREA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("textarea[id]").expect("valid selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h4").expect("valid selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static MARK_SCHEME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".mark-scheme").expect("valid selector"));

static ASSIGNMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Assignment ID: ([\w-]+)").expect("valid regex"));
static GRADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Grade:[ \t]*(\S+)").expect("valid regex"));
static MARK_SCHEME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Mark Scheme:\s*").expect("valid regex"));

/// A written question found in worksheet markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenQuestion {
    pub id: String,
    pub text: String,
    pub mark_scheme: String,
}

/// A downloadable text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExport {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub updated: usize,
    /// Blocks without both a grade and feedback.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub assignment_id: String,
    pub grade: String,
    pub feedback: String,
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Written questions in document order: every question container holding a
/// `textarea`, with its `h4` and paragraphs as the question and its
/// `.mark-scheme` block as the scheme.
pub fn written_questions(markup: &str) -> Vec<WrittenQuestion> {
    let html = Html::parse_document(markup);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for container in html.select(&QUESTION_CONTAINER) {
        let Some(id) = container
            .select(&TEXTAREA)
            .next()
            .and_then(|t| t.value().id())
        else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }

        let scheme_el = container.select(&MARK_SCHEME).next();
        let mark_scheme = match scheme_el {
            Some(el) => MARK_SCHEME_PREFIX.replace(&text_of(el), "").into_owned(),
            None => "Mark scheme not found.".to_string(),
        };

        let mut parts: Vec<String> = container
            .select(&HEADING)
            .next()
            .map(text_of)
            .into_iter()
            .collect();
        parts.extend(
            container
                .select(&PARAGRAPH)
                .filter(|p| match scheme_el {
                    Some(ms) => !p.ancestors().any(|a| a == *ms),
                    None => true,
                })
                .map(text_of),
        );
        let text = if parts.is_empty() {
            "Question text not found.".to_string()
        } else {
            parts.join("\n")
        };

        out.push(WrittenQuestion {
            id: id.to_string(),
            text,
            mark_scheme,
        });
    }
    out
}

/// The student's answer to `question_id`, if it is non-blank.
fn answer_in(work: Option<&Value>, question_id: &str) -> Option<String> {
    let work = work?;
    let inputs = match work.get("inputs") {
        Some(Value::Object(_)) => &work["inputs"],
        _ => work,
    };
    let answer = match inputs.get(question_id)? {
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!answer.trim().is_empty()).then_some(answer)
}

fn header(title: &str, class_name: &str) -> String {
    format!("Worksheet: {title}\nClass: {class_name}\n\n")
}

fn block_start(out: &mut String, username: &str, assignment_id: i64) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(START);
    out.push('\n');
    out.push_str(&format!("Student: {username}\nAssignment ID: {assignment_id}\n---\n"));
}

fn file_name(class_name: &str, title: &str, suffix: &str) -> String {
    let underscored = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}-{}_{suffix}.txt", underscored(class_name), underscored(title))
}

/// Parses a filled feedback template. Blocks missing an id, a grade or
/// feedback text are counted as skipped.
pub fn parse_feedback(content: &str) -> (Vec<FeedbackEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0;

    for block in content.split(START) {
        if block.trim().is_empty() {
            continue;
        }
        let Some(id) = ASSIGNMENT_ID.captures(block).map(|c| c[1].to_string()) else {
            // Preamble before the first block has no id.
            if block.contains(END) {
                skipped += 1;
            }
            continue;
        };
        let grade = GRADE.captures(block).map(|c| c[1].trim().to_string());
        let feedback = block.find("Feedback:\n").and_then(|at| {
            let rest = &block[at + "Feedback:\n".len()..];
            rest.find(END).map(|end| rest[..end].trim().to_string())
        });

        match (grade, feedback) {
            (Some(grade), Some(feedback)) if !grade.is_empty() && !feedback.is_empty() => {
                entries.push(FeedbackEntry {
                    assignment_id: id,
                    grade,
                    feedback,
                })
            }
            _ => skipped += 1,
        }
    }
    (entries, skipped)
}

impl<A: PersistenceAdapter> AssignmentHost<A> {
    async fn class_listing(
        &self,
        caller: &Caller,
        class_id: i64,
        worksheet_id: i64,
    ) -> Result<(String, Vec<(assignment::Model, String)>), ServiceError> {
        self.ensure_teacher_of(caller, class_id).await?;
        let class = class::Entity::find_by_id(class_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("class"))?;

        let assignments =
            assignment::Model::find_for_class_worksheet(&self.db, class_id, worksheet_id).await?;
        if assignments.is_empty() {
            return Err(ServiceError::precondition(
                "No assignments for this worksheet in this class",
            ));
        }

        let ids: Vec<i64> = assignments.iter().map(|a| a.student_id).collect();
        let names: HashMap<i64, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let listed = assignments
            .into_iter()
            .map(|a| {
                let name = names.get(&a.student_id).cloned().unwrap_or_default();
                (a, name)
            })
            .collect();
        Ok((class.name, listed))
    }

    /// Every student's written answers with question text and mark scheme.
    pub async fn export_answers(
        &self,
        caller: &Caller,
        class_id: i64,
        worksheet_id: i64,
    ) -> Result<TextExport, ServiceError> {
        let (class_name, listed) = self.class_listing(caller, class_id, worksheet_id).await?;
        let ws = self.worksheet(worksheet_id).await?;
        let questions = written_questions(ws.html_content.as_deref().unwrap_or_default());

        let mut out = header(&ws.title, &class_name);
        for (a, username) in &listed {
            block_start(&mut out, username, a.id);

            let mut any = false;
            for q in &questions {
                if let Some(answer) = answer_in(a.student_work.as_ref(), &q.id) {
                    any = true;
                    out.push_str(&format!(
                        "Question ID: {}\nQuestion: {}\nMark Scheme: {}\nAnswer: {answer}\n\n",
                        q.id, q.text, q.mark_scheme
                    ));
                }
            }
            if !any {
                out.push_str("No written answers submitted.\n\n");
            }
            out.push_str(END);
            out.push_str("\n\n");
        }

        tracing::info!(class_id, worksheet_id, students = listed.len(), "exported answers");
        Ok(TextExport {
            file_name: file_name(&class_name, &ws.title, "Answers"),
            content: out,
        })
    }

    /// A blank grade and feedback block per assignment.
    pub async fn feedback_template(
        &self,
        caller: &Caller,
        class_id: i64,
        worksheet_id: i64,
    ) -> Result<TextExport, ServiceError> {
        let (class_name, listed) = self.class_listing(caller, class_id, worksheet_id).await?;
        let ws = self.worksheet(worksheet_id).await?;

        let mut out = header(&ws.title, &class_name);
        for (a, username) in &listed {
            block_start(&mut out, username, a.id);
            out.push_str("Grade: \nFeedback:\n");
            out.push_str(END);
            out.push_str("\n\n");
        }

        Ok(TextExport {
            file_name: file_name(&class_name, &ws.title, "Feedback_Template"),
            content: out,
        })
    }

    /// Applies a filled template. Every referenced assignment must belong to
    /// this class and worksheet; otherwise nothing is written.
    pub async fn import_feedback(
        &self,
        caller: &Caller,
        class_id: i64,
        worksheet_id: i64,
        content: &str,
    ) -> Result<ImportSummary, ServiceError> {
        self.ensure_teacher_of(caller, class_id).await?;

        let (entries, skipped) = parse_feedback(content);
        if entries.is_empty() {
            return Err(ServiceError::InvalidInput(
                "No valid feedback blocks found".into(),
            ));
        }

        let mut parsed = Vec::with_capacity(entries.len());
        for e in &entries {
            let id: i64 = e.assignment_id.parse().map_err(|_| {
                ServiceError::InvalidInput(format!("Unknown assignment id '{}'", e.assignment_id))
            })?;
            parsed.push((id, e));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();
        for (id, e) in &parsed {
            let res = assignment::Entity::update_many()
                .set(assignment::ActiveModel {
                    mark: Set(Some(e.grade.clone())),
                    feedback: Set(Some(e.feedback.clone())),
                    status: Set(AssignmentStatus::Completed),
                    updated_at: Set(now),
                    ..Default::default()
                })
                .filter(assignment::Column::Id.eq(*id))
                .filter(assignment::Column::ClassId.eq(class_id))
                .filter(assignment::Column::WorksheetId.eq(worksheet_id))
                .exec(&txn)
                .await?;
            if res.rows_affected == 0 {
                txn.rollback().await?;
                tracing::warn!(
                    class_id,
                    worksheet_id,
                    assignment_id = id,
                    "feedback import rejected"
                );
                return Err(ServiceError::InvalidInput(format!(
                    "Assignment {id} does not belong to this class and worksheet"
                )));
            }
        }
        txn.commit().await?;

        for (id, e) in &parsed {
            self.notify(
                *id,
                "marked",
                &json!({
                    "assignment_id": id,
                    "status": AssignmentStatus::Completed,
                    "mark": e.grade
                }),
            )
            .await;
        }

        tracing::info!(
            class_id,
            worksheet_id,
            updated = parsed.len(),
            skipped,
            "feedback imported"
        );
        Ok(ImportSummary {
            updated: parsed.len(),
            skipped,
        })
    }
}
