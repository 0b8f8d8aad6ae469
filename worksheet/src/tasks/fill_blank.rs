//! Fill-in-the-blank task.
//!
//! Markup: a `blank-*` task element containing inputs with `data-blank="<id>"`
//! and optionally `data-answer="<expected>"`. Checking is case-insensitive and
//! ignores surrounding whitespace.

use super::{Feedback, Task, ensure_interactive, mismatch, rejected};
use crate::document::Action;
use crate::error::{InteractionError, TaskError};
use crate::snapshot::TaskState;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;

static BLANK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-blank]").expect("valid selector"));

#[derive(Debug, Clone)]
pub struct Blank {
    pub id: String,
    pub answer: Option<String>,
}

#[derive(Debug)]
pub struct FillBlankTask {
    id: String,
    blanks: Vec<Blank>,
    values: Option<BTreeMap<String, String>>,
    interactive: bool,
    feedback: Option<Feedback>,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

impl FillBlankTask {
    pub fn new(id: impl Into<String>, blanks: Vec<Blank>) -> Self {
        Self {
            id: id.into(),
            blanks,
            values: None,
            interactive: true,
            feedback: None,
        }
    }

    pub fn build(id: &str, element: ElementRef<'_>) -> Box<dyn Task> {
        let blanks = element
            .select(&BLANK)
            .filter_map(|el| {
                let v = el.value();
                v.attr("data-blank").map(|b| Blank {
                    id: b.to_string(),
                    answer: v.attr("data-answer").map(str::to_string),
                })
            })
            .collect();
        Box::new(Self::new(id, blanks))
    }

    pub fn value(&self, blank: &str) -> Option<&str> {
        self.values.as_ref()?.get(blank).map(String::as_str)
    }

    fn knows(&self, blank: &str) -> bool {
        self.blanks.iter().any(|b| b.id == blank)
    }
}

impl Task for FillBlankTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "fill_blank"
    }

    fn extract(&self) -> Option<TaskState> {
        self.values
            .as_ref()
            .map(|v| TaskState::FillBlank { blanks: v.clone() })
    }

    fn apply(&mut self, state: &TaskState) -> Result<(), TaskError> {
        let TaskState::FillBlank { blanks } = state else {
            return Err(mismatch(self.kind(), state));
        };
        let known: BTreeMap<String, String> = blanks
            .iter()
            .filter(|(id, _)| self.knows(id))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.values = Some(known);
        Ok(())
    }

    fn check(&mut self) -> Feedback {
        let graded: Vec<&Blank> = self.blanks.iter().filter(|b| b.answer.is_some()).collect();
        let correct = graded
            .iter()
            .filter(|b| {
                match (self.value(&b.id), b.answer.as_deref()) {
                    (Some(given), Some(expected)) => normalize(given) == normalize(expected),
                    _ => false,
                }
            })
            .count();
        let feedback = Feedback {
            correct,
            total: graded.len(),
        };
        self.feedback = Some(feedback);
        feedback
    }

    fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn act(&mut self, action: &Action) -> Result<(), InteractionError> {
        ensure_interactive(self)?;
        match action {
            Action::FillBlank { blank, text, .. } => {
                if !self.knows(blank) {
                    return Err(rejected(&self.id, format!("unknown blank '{blank}'")));
                }
                self.values
                    .get_or_insert_with(BTreeMap::new)
                    .insert(blank.clone(), text.clone());
                Ok(())
            }
            other => Err(rejected(&self.id, format!("{} is not a fill-in action", other.name()))),
        }
    }

    fn clear(&mut self) {
        self.values = None;
        self.feedback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> FillBlankTask {
        FillBlankTask::new(
            "blank-capitals",
            vec![
                Blank { id: "fr".into(), answer: Some("Paris".into()) },
                Blank { id: "de".into(), answer: Some("Berlin".into()) },
                Blank { id: "note".into(), answer: None },
            ],
        )
    }

    fn fill(blank: &str, text: &str) -> Action {
        Action::FillBlank {
            task: "blank-capitals".into(),
            blank: blank.into(),
            text: text.into(),
        }
    }

    #[test]
    fn check_ignores_case_and_whitespace_and_ungraded_blanks() {
        let mut t = task();
        t.act(&fill("fr", "  paris ")).unwrap();
        t.act(&fill("de", "Bonn")).unwrap();
        t.act(&fill("note", "anything")).unwrap();
        assert_eq!(t.check(), Feedback { correct: 1, total: 2 });
    }

    #[test]
    fn extract_keeps_text_verbatim() {
        let mut t = task();
        t.act(&fill("fr", "  paris ")).unwrap();
        let Some(TaskState::FillBlank { blanks }) = t.extract() else {
            panic!("expected fill_blank state");
        };
        assert_eq!(blanks["fr"], "  paris ");
    }

    #[test]
    fn apply_drops_unknown_blanks() {
        let mut t = task();
        let mut blanks = BTreeMap::new();
        blanks.insert("fr".to_string(), "Paris".to_string());
        blanks.insert("it".to_string(), "Rome".to_string());
        t.apply(&TaskState::FillBlank { blanks }).unwrap();
        assert_eq!(t.value("fr"), Some("Paris"));
        assert_eq!(t.value("it"), None);
    }
}
