//! Drag-and-drop labelling task.
//!
//! Markup: a `drop-*` task element containing draggable `[data-item="<id>"]`
//! labels and `[data-zone="<id>"]` targets; a zone may name its expected label
//! with `data-accepts`. Each zone holds at most one item and each item sits in
//! at most one zone. Dropping onto an occupied zone sends the previous item
//! back to the bank.

use super::{Feedback, Task, ensure_interactive, mismatch, rejected};
use crate::document::Action;
use crate::error::{InteractionError, TaskError};
use crate::snapshot::TaskState;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;

static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-item]").expect("valid selector"));
static ZONE: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-zone]").expect("valid selector"));

#[derive(Debug, Clone)]
pub struct Zone {
    pub id: String,
    pub accepts: Option<String>,
}

#[derive(Debug)]
pub struct DragDropTask {
    id: String,
    items: Vec<String>,
    zones: Vec<Zone>,
    placements: Option<BTreeMap<String, String>>,
    interactive: bool,
    feedback: Option<Feedback>,
}

impl DragDropTask {
    pub fn new(id: impl Into<String>, items: Vec<String>, zones: Vec<Zone>) -> Self {
        Self {
            id: id.into(),
            items,
            zones,
            placements: None,
            interactive: true,
            feedback: None,
        }
    }

    pub fn build(id: &str, element: ElementRef<'_>) -> Box<dyn Task> {
        let items = element
            .select(&ITEM)
            .filter_map(|el| el.value().attr("data-item").map(str::to_string))
            .collect();
        let zones = element
            .select(&ZONE)
            .filter_map(|el| {
                let v = el.value();
                v.attr("data-zone").map(|z| Zone {
                    id: z.to_string(),
                    accepts: v.attr("data-accepts").map(str::to_string),
                })
            })
            .collect();
        Box::new(Self::new(id, items, zones))
    }

    /// Item currently placed in `zone`, if any.
    pub fn placed_in(&self, zone: &str) -> Option<&str> {
        self.placements.as_ref()?.get(zone).map(String::as_str)
    }

    /// Items not placed in any zone, in markup order.
    pub fn bank(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| {
                !self
                    .placements
                    .as_ref()
                    .is_some_and(|p| p.values().any(|placed| placed == *item))
            })
            .map(String::as_str)
            .collect()
    }

    fn knows_item(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    fn knows_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z.id == zone)
    }
}

impl Task for DragDropTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "drag_drop_label"
    }

    fn extract(&self) -> Option<TaskState> {
        self.placements
            .as_ref()
            .map(|p| TaskState::DragDropLabel { placements: p.clone() })
    }

    fn apply(&mut self, state: &TaskState) -> Result<(), TaskError> {
        let TaskState::DragDropLabel { placements } = state else {
            return Err(mismatch(self.kind(), state));
        };
        let mut known: BTreeMap<String, String> = BTreeMap::new();
        for (zone, item) in placements {
            if !self.knows_zone(zone) || !self.knows_item(item) {
                continue;
            }
            // An item sits in at most one zone; later repeats are stale.
            if known.values().any(|placed| placed == item) {
                tracing::debug!(task = %self.id, %zone, %item, "skipping repeated placement");
                continue;
            }
            known.insert(zone.clone(), item.clone());
        }
        self.placements = Some(known);
        Ok(())
    }

    fn check(&mut self) -> Feedback {
        let graded: Vec<&Zone> = self.zones.iter().filter(|z| z.accepts.is_some()).collect();
        let correct = graded
            .iter()
            .filter(|z| {
                self.placed_in(&z.id).is_some() && self.placed_in(&z.id) == z.accepts.as_deref()
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
            Action::Drop { item, zone, .. } => {
                if !self.knows_item(item) {
                    return Err(rejected(&self.id, format!("unknown item '{item}'")));
                }
                if !self.knows_zone(zone) {
                    return Err(rejected(&self.id, format!("unknown zone '{zone}'")));
                }
                let placements = self.placements.get_or_insert_with(BTreeMap::new);
                placements.retain(|_, placed| placed != item);
                placements.insert(zone.clone(), item.clone());
                Ok(())
            }
            Action::ReturnItem { item, .. } => {
                self.placements
                    .get_or_insert_with(BTreeMap::new)
                    .retain(|_, placed| placed != item);
                Ok(())
            }
            other => Err(rejected(
                &self.id,
                format!("{} is not a drag-and-drop action", other.name()),
            )),
        }
    }

    fn clear(&mut self) {
        self.placements = None;
        self.feedback = None;
    }
}
