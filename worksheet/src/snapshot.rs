//! Serializable interaction state of one worksheet instance.
//!
//! Maps are ordered so that two snapshots of the same state compare equal and
//! serialize identically, which is what the sync controller diffs on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Free-text field id -> value.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,

    /// Task id -> task-specific state.
    #[serde(default)]
    pub interactive_states: BTreeMap<String, TaskState>,

    /// Informational only; never needed to restore answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_metrics: Option<EngagementMetrics>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
            && self.interactive_states.is_empty()
            && self.engagement_metrics.is_none()
    }
}

/// State of one interactive task, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskState {
    MatchPairs { matched: BTreeSet<String> },
    FillBlank { blanks: BTreeMap<String, String> },
    /// Drop zone id -> placed item id.
    DragDropLabel { placements: BTreeMap<String, String> },
    SingleChoice { selected: usize },
}

impl TaskState {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskState::MatchPairs { .. } => "match_pairs",
            TaskState::FillBlank { .. } => "fill_blank",
            TaskState::DragDropLabel { .. } => "drag_drop_label",
            TaskState::SingleChoice { .. } => "single_choice",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    /// Section id -> cumulative seconds visible.
    #[serde(default)]
    pub time_on_section: BTreeMap<String, u64>,
    /// Section id -> click count.
    #[serde(default)]
    pub interaction_counts: BTreeMap<String, u64>,
}

impl EngagementMetrics {
    pub fn is_empty(&self) -> bool {
        self.time_on_section.is_empty() && self.interaction_counts.is_empty()
    }
}
