//! Matching task: the learner connects items into pairs.
//!
//! Markup: a `match-*` task element containing one `[data-pair]` element per
//! correct pairing. The state is the set of pair ids the learner has matched.

use super::{Feedback, Task, ensure_interactive, mismatch, rejected};
use crate::document::Action;
use crate::error::{InteractionError, TaskError};
use crate::snapshot::TaskState;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::collections::BTreeSet;

static PAIR: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-pair]").expect("valid selector"));

#[derive(Debug)]
pub struct MatchPairsTask {
    id: String,
    pairs: Vec<String>,
    matched: Option<BTreeSet<String>>,
    interactive: bool,
    feedback: Option<Feedback>,
}

impl MatchPairsTask {
    pub fn new(id: impl Into<String>, pairs: Vec<String>) -> Self {
        Self {
            id: id.into(),
            pairs,
            matched: None,
            interactive: true,
            feedback: None,
        }
    }

    pub fn build(id: &str, element: ElementRef<'_>) -> Box<dyn Task> {
        let mut pairs: Vec<String> = Vec::new();
        for el in element.select(&PAIR) {
            if let Some(pair) = el.value().attr("data-pair") {
                if !pairs.iter().any(|p| p == pair) {
                    pairs.push(pair.to_string());
                }
            }
        }
        Box::new(Self::new(id, pairs))
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn is_matched(&self, pair: &str) -> bool {
        self.matched.as_ref().is_some_and(|m| m.contains(pair))
    }

    fn knows(&self, pair: &str) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }
}

impl Task for MatchPairsTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "match_pairs"
    }

    fn extract(&self) -> Option<TaskState> {
        self.matched.as_ref().map(|m| TaskState::MatchPairs { matched: m.clone() })
    }

    fn apply(&mut self, state: &TaskState) -> Result<(), TaskError> {
        let TaskState::MatchPairs { matched } = state else {
            return Err(mismatch(self.kind(), state));
        };
        let known: BTreeSet<String> = matched.iter().filter(|p| self.knows(p)).cloned().collect();
        if known.len() != matched.len() {
            tracing::debug!(
                task = %self.id,
                dropped = matched.len() - known.len(),
                "dropping unknown pairs"
            );
        }
        self.matched = Some(known);
        Ok(())
    }

    fn check(&mut self) -> Feedback {
        let feedback = Feedback {
            correct: self.matched.as_ref().map_or(0, |m| m.len()),
            total: self.pairs.len(),
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
            Action::Match { pair, .. } => {
                if !self.knows(pair) {
                    return Err(rejected(&self.id, format!("unknown pair '{pair}'")));
                }
                self.matched.get_or_insert_with(BTreeSet::new).insert(pair.clone());
                Ok(())
            }
            Action::Unmatch { pair, .. } => {
                self.matched.get_or_insert_with(BTreeSet::new).remove(pair);
                Ok(())
            }
            other => Err(rejected(&self.id, format!("{} is not a matching action", other.name()))),
        }
    }

    fn clear(&mut self) {
        self.matched = None;
        self.feedback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> MatchPairsTask {
        MatchPairsTask::new(
            "match-rivers",
            vec!["nile".into(), "amazon".into(), "danube".into(), "volga".into()],
        )
    }

    fn matching(pair: &str) -> Action {
        Action::Match {
            task: "match-rivers".into(),
            pair: pair.into(),
        }
    }

    #[test]
    fn untouched_task_extracts_nothing() {
        assert_eq!(task().extract(), None);
    }

    #[test]
    fn matching_two_of_four_reports_partial_feedback() {
        let mut t = task();
        t.act(&matching("nile")).unwrap();
        t.act(&matching("volga")).unwrap();

        assert_eq!(
            t.extract(),
            Some(TaskState::MatchPairs {
                matched: ["nile".to_string(), "volga".to_string()].into()
            })
        );
        let fb = t.check();
        assert_eq!(fb, Feedback { correct: 2, total: 4 });
        assert!(!fb.is_complete());
    }

    #[test]
    fn unknown_pair_is_rejected_and_dropped_on_apply() {
        let mut t = task();
        assert!(matches!(t.act(&matching("thames")), Err(InteractionError::Rejected { .. })));

        t.apply(&TaskState::MatchPairs {
            matched: ["nile".to_string(), "thames".to_string()].into(),
        })
        .unwrap();
        assert!(t.is_matched("nile"));
        assert!(!t.is_matched("thames"));
    }

    #[test]
    fn wrong_kind_is_a_mismatch() {
        let mut t = task();
        let err = t.apply(&TaskState::SingleChoice { selected: 0 }).unwrap_err();
        assert_eq!(
            err,
            TaskError::KindMismatch {
                expected: "match_pairs",
                found: "single_choice"
            }
        );
    }

    #[test]
    fn read_only_task_refuses_actions() {
        let mut t = task();
        t.set_interactive(false);
        assert_eq!(t.act(&matching("nile")), Err(InteractionError::ReadOnly));
    }
}
