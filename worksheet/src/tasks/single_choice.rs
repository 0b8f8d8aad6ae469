//! Inline single-choice widget.
//!
//! Markup: a `choice-*` task element with one `[data-option]` child per option,
//! in display order, and optionally `data-correct="<index>"` on the task.

use super::{Feedback, Task, ensure_interactive, mismatch, rejected};
use crate::document::Action;
use crate::error::{InteractionError, TaskError};
use crate::snapshot::TaskState;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static OPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-option]").expect("valid selector"));

#[derive(Debug)]
pub struct SingleChoiceTask {
    id: String,
    options: usize,
    correct: Option<usize>,
    selected: Option<usize>,
    interactive: bool,
    feedback: Option<Feedback>,
}

impl SingleChoiceTask {
    pub fn new(id: impl Into<String>, options: usize, correct: Option<usize>) -> Self {
        Self {
            id: id.into(),
            options,
            correct,
            selected: None,
            interactive: true,
            feedback: None,
        }
    }

    pub fn build(id: &str, element: ElementRef<'_>) -> Box<dyn Task> {
        let options = element.select(&OPTION).count();
        let correct = element
            .value()
            .attr("data-correct")
            .and_then(|c| c.trim().parse().ok());
        Box::new(Self::new(id, options, correct))
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }
}

impl Task for SingleChoiceTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "single_choice"
    }

    fn extract(&self) -> Option<TaskState> {
        self.selected.map(|selected| TaskState::SingleChoice { selected })
    }

    fn apply(&mut self, state: &TaskState) -> Result<(), TaskError> {
        let TaskState::SingleChoice { selected } = state else {
            return Err(mismatch(self.kind(), state));
        };
        if *selected >= self.options {
            return Err(TaskError::OptionOutOfRange {
                index: *selected,
                len: self.options,
            });
        }
        self.selected = Some(*selected);
        Ok(())
    }

    fn check(&mut self) -> Feedback {
        let feedback = Feedback {
            correct: usize::from(self.correct.is_some() && self.selected == self.correct),
            total: usize::from(self.correct.is_some()),
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
            Action::Select { option, .. } => {
                if *option >= self.options {
                    return Err(rejected(
                        &self.id,
                        format!("option {option} out of range ({} options)", self.options),
                    ));
                }
                self.selected = Some(*option);
                Ok(())
            }
            other => Err(rejected(&self.id, format!("{} is not a choice action", other.name()))),
        }
    }

    fn clear(&mut self) {
        self.selected = None;
        self.feedback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(option: usize) -> Action {
        Action::Select {
            task: "choice-q1".into(),
            option,
        }
    }

    #[test]
    fn selection_is_checked_against_the_key() {
        let mut t = SingleChoiceTask::new("choice-q1", 3, Some(2));
        t.act(&select(1)).unwrap();
        assert_eq!(t.check(), Feedback { correct: 0, total: 1 });
        t.act(&select(2)).unwrap();
        assert!(t.check().is_complete());
    }

    #[test]
    fn out_of_range_is_refused_both_ways() {
        let mut t = SingleChoiceTask::new("choice-q1", 2, None);
        assert!(t.act(&select(5)).is_err());
        assert_eq!(
            t.apply(&TaskState::SingleChoice { selected: 2 }),
            Err(TaskError::OptionOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(t.extract(), None);
    }

    #[test]
    fn ungraded_choice_has_empty_feedback() {
        let mut t = SingleChoiceTask::new("choice-poll", 4, None);
        t.act(&select(0)).unwrap();
        assert_eq!(t.check(), Feedback { correct: 0, total: 0 });
    }
}
