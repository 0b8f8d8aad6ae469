//! Mapping between a live [`WorksheetDocument`] and a [`Snapshot`].
//!
//! `extract` is a pure read. `load` replays a snapshot, skipping entries whose
//! ids no longer exist in the document, and runs each restored task's check so
//! feedback matches what the learner last saw. For a fresh document and a
//! snapshot whose ids all resolve, `extract(load(s)) == s`.

use crate::document::WorksheetDocument;
use crate::error::TaskError;
use crate::snapshot::{EngagementMetrics, Snapshot};
use std::collections::BTreeMap;

pub fn extract(doc: &WorksheetDocument) -> Snapshot {
    let inputs = doc
        .fields()
        .iter()
        .filter_map(|f| f.value().map(|v| (f.id.clone(), v.to_string())))
        .collect();

    let interactive_states = doc
        .tasks()
        .filter_map(|t| t.extract().map(|s| (t.id().to_string(), s)))
        .collect();

    Snapshot {
        inputs,
        interactive_states,
        engagement_metrics: doc.metrics().cloned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The id is not in the current document.
    UnknownId,
    /// The task exists but refused the saved state.
    Rejected(TaskError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub id: String,
    pub reason: SkipReason,
}

/// Outcome of [`load`]. Skips are expected after a worksheet is revised and
/// are never surfaced to the learner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: Vec<String>,
    pub skipped: Vec<Skipped>,
}

impl LoadReport {
    fn skip(&mut self, id: &str, reason: SkipReason) {
        tracing::debug!(id, ?reason, "skipping snapshot entry");
        self.skipped.push(Skipped {
            id: id.to_string(),
            reason,
        });
    }
}

pub fn load(doc: &mut WorksheetDocument, snapshot: &Snapshot) -> LoadReport {
    let mut report = LoadReport::default();

    for (id, value) in &snapshot.inputs {
        if doc.set_field_value(id, value) {
            report.applied.push(id.clone());
        } else {
            report.skip(id, SkipReason::UnknownId);
        }
    }

    for (id, state) in &snapshot.interactive_states {
        let Some(task) = doc.task_for_load(id) else {
            report.skip(id, SkipReason::UnknownId);
            continue;
        };
        match task.apply(state) {
            Ok(()) => {
                task.check();
                report.applied.push(id.clone());
            }
            Err(e) => report.skip(id, SkipReason::Rejected(e)),
        }
    }

    if let Some(metrics) = &snapshot.engagement_metrics {
        let known = |m: &BTreeMap<String, u64>| -> BTreeMap<String, u64> {
            m.iter()
                .filter(|(section, _)| doc.sections().iter().any(|s| s == *section))
                .map(|(k, v)| (k.clone(), *v))
                .collect()
        };
        let restored = EngagementMetrics {
            time_on_section: known(&metrics.time_on_section),
            interaction_counts: known(&metrics.interaction_counts),
        };
        doc.set_metrics(restored);
    }

    report
}
