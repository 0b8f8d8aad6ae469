//! The live worksheet document.
//!
//! Built once from author markup. Holds free-text fields, task handlers and
//! tracked sections, and models every user interaction as an explicit
//! [`Action`]. A document is `Live` until [`WorksheetDocument::freeze`] moves
//! it to `Frozen`; there is no way back.

use crate::error::InteractionError;
use crate::snapshot::EngagementMetrics;
use crate::tasks::{Feedback, Task, TaskRegistry};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TASK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-task][id]").expect("valid selector"));
static FIELD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[id], textarea[id]").expect("valid selector"));
static SECTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-section][id]").expect("valid selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Live,
    Frozen,
}

/// A user interaction with the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetInput { field: String, value: String },
    Match { task: String, pair: String },
    Unmatch { task: String, pair: String },
    FillBlank { task: String, blank: String, text: String },
    Drop { task: String, item: String, zone: String },
    ReturnItem { task: String, item: String },
    Select { task: String, option: usize },
    /// Resets a task, or empties a text field.
    Clear { target: String },
}

impl Action {
    /// Id of the field or task the action is aimed at.
    pub fn target(&self) -> &str {
        match self {
            Action::SetInput { field, .. } => field,
            Action::Match { task, .. }
            | Action::Unmatch { task, .. }
            | Action::FillBlank { task, .. }
            | Action::Drop { task, .. }
            | Action::ReturnItem { task, .. }
            | Action::Select { task, .. } => task,
            Action::Clear { target } => target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetInput { .. } => "set_input",
            Action::Match { .. } => "match",
            Action::Unmatch { .. } => "unmatch",
            Action::FillBlank { .. } => "fill_blank",
            Action::Drop { .. } => "drop",
            Action::ReturnItem { .. } => "return_item",
            Action::Select { .. } => "select",
            Action::Clear { .. } => "clear",
        }
    }
}

/// A free-text `input` or `textarea` that is not part of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub id: String,
    pub multiline: bool,
    value: Option<String>,
    read_only: bool,
}

impl TextField {
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

#[derive(Debug)]
pub struct WorksheetDocument {
    fields: Vec<TextField>,
    tasks: Vec<Box<dyn Task>>,
    sections: Vec<String>,
    metrics: Option<EngagementMetrics>,
    phase: Phase,
}

fn inside_task(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(|n| n.value().as_element())
        .any(|e| e.attr("data-task").is_some())
}

fn is_text_input(el: &ElementRef<'_>) -> bool {
    let v = el.value();
    match v.name() {
        "textarea" => true,
        "input" => matches!(
            v.attr("type").map(|t| t.to_ascii_lowercase()).as_deref(),
            None | Some("text") | Some("number")
        ),
        _ => false,
    }
}

impl WorksheetDocument {
    /// Parses author markup. Never fails: unknown task prefixes and
    /// non-text inputs are simply not tracked.
    pub fn parse(markup: &str, registry: &TaskRegistry) -> Self {
        let html = Html::parse_document(markup);

        let mut tasks: Vec<Box<dyn Task>> = Vec::new();
        for el in html.select(&TASK) {
            let Some(id) = el.value().id() else { continue };
            if tasks.iter().any(|t| t.id() == id) {
                tracing::debug!(task = id, "duplicate task id ignored");
                continue;
            }
            match registry.builder_for(id) {
                Some(build) => tasks.push(build(id, el)),
                None => tracing::debug!(task = id, "no handler registered for task"),
            }
        }

        let mut fields: Vec<TextField> = Vec::new();
        for el in html.select(&FIELD) {
            if !is_text_input(&el) || inside_task(&el) {
                continue;
            }
            let Some(id) = el.value().id() else { continue };
            if fields.iter().any(|f| f.id == id) || tasks.iter().any(|t| t.id() == id) {
                continue;
            }
            fields.push(TextField {
                id: id.to_string(),
                multiline: el.value().name() == "textarea",
                value: None,
                read_only: false,
            });
        }

        let mut sections: Vec<String> = Vec::new();
        for el in html.select(&SECTION) {
            if let Some(id) = el.value().id() {
                if !sections.iter().any(|s| s == id) {
                    sections.push(id.to_string());
                }
            }
        }

        Self {
            fields,
            tasks,
            sections,
            metrics: None,
            phase: Phase::Live,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Frozen
    }

    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&TextField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn input(&self, id: &str) -> Option<&str> {
        self.field(id).and_then(TextField::value)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &dyn Task> {
        self.tasks.iter().map(|t| t.as_ref())
    }

    pub fn task(&self, id: &str) -> Option<&dyn Task> {
        self.tasks.iter().find(|t| t.id() == id).map(|t| t.as_ref())
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn metrics(&self) -> Option<&EngagementMetrics> {
        self.metrics.as_ref()
    }

    /// Applies one user interaction.
    pub fn act(&mut self, action: &Action) -> Result<(), InteractionError> {
        if self.is_frozen() {
            return Err(InteractionError::ReadOnly);
        }
        match action {
            Action::SetInput { field, value } => {
                let f = self
                    .field_mut(field)
                    .ok_or_else(|| InteractionError::UnknownTarget(field.clone()))?;
                f.value = Some(value.clone());
                Ok(())
            }
            Action::Clear { target } => {
                if let Some(f) = self.field_mut(target) {
                    f.value = None;
                    return Ok(());
                }
                self.task_mut(target)?.clear();
                Ok(())
            }
            other => self.task_mut(other.target())?.act(other),
        }
    }

    /// The task's "check my answer" button.
    pub fn check(&mut self, task: &str) -> Result<Feedback, InteractionError> {
        Ok(self.task_mut(task)?.check())
    }

    /// Adds `seconds` of visibility to a tracked section.
    pub fn record_visible(&mut self, section: &str, seconds: u64) -> Result<(), InteractionError> {
        self.ensure_section(section)?;
        let total = self
            .metrics
            .get_or_insert_with(EngagementMetrics::default)
            .time_on_section
            .entry(section.to_string())
            .or_insert(0);
        *total = total.saturating_add(seconds);
        Ok(())
    }

    pub fn record_click(&mut self, section: &str) -> Result<(), InteractionError> {
        self.ensure_section(section)?;
        let count = self
            .metrics
            .get_or_insert_with(EngagementMetrics::default)
            .interaction_counts
            .entry(section.to_string())
            .or_insert(0);
        *count = count.saturating_add(1);
        Ok(())
    }

    /// Makes every field and task non-interactive. Terminal.
    pub fn freeze(&mut self) {
        for f in &mut self.fields {
            f.read_only = true;
        }
        for t in &mut self.tasks {
            t.set_interactive(false);
        }
        self.phase = Phase::Frozen;
    }

    fn ensure_section(&self, section: &str) -> Result<(), InteractionError> {
        if self.is_frozen() {
            return Err(InteractionError::ReadOnly);
        }
        if !self.sections.iter().any(|s| s == section) {
            return Err(InteractionError::UnknownTarget(section.to_string()));
        }
        Ok(())
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut TextField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Box<dyn Task>, InteractionError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| InteractionError::UnknownTarget(id.to_string()))
    }

    pub(crate) fn set_field_value(&mut self, id: &str, value: &str) -> bool {
        match self.field_mut(id) {
            Some(f) => {
                f.value = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    pub(crate) fn task_for_load(&mut self, id: &str) -> Option<&mut Box<dyn Task>> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    pub(crate) fn set_metrics(&mut self, metrics: EngagementMetrics) {
        self.metrics = Some(metrics);
    }
}
