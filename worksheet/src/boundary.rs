//! The one message channel out of the sandbox.
//!
//! Egress is a tagged message `{ "type": "SAVE_WORKSHEET_DATA", "payload": <Snapshot> }`.
//! Everything arriving from the embedded page is untrusted, so the host runs
//! it through [`parse_message`] before anything else sees it:
//!
//! - the raw body is capped at a configured size;
//! - the message and its payload must be JSON objects;
//! - unknown `type` values are ignored, unknown payload keys are ignored;
//! - input values must be strings (numbers and booleans are stringified);
//! - task entries that don't parse as a known kind are dropped one by one.

use crate::error::BoundaryError;
use crate::snapshot::{EngagementMetrics, Snapshot, TaskState};
use serde_json::{Map, Value, json};

pub const SAVE_WORKSHEET_DATA: &str = "SAVE_WORKSHEET_DATA";

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryMessage {
    SaveWorksheetData {
        snapshot: Snapshot,
        /// Entries removed during validation, as `section.id`.
        dropped: Vec<String>,
    },
    /// A message of some other `type`.
    Ignored(String),
}

/// Serializes the save message the embedded page posts to its host.
pub fn encode_save(snapshot: &Snapshot) -> Value {
    json!({
        "type": SAVE_WORKSHEET_DATA,
        "payload": snapshot,
    })
}

/// Validates an untrusted message body of at most `limit` bytes.
pub fn parse_message(raw: &[u8], limit: usize) -> Result<BoundaryMessage, BoundaryError> {
    if raw.len() > limit {
        return Err(BoundaryError::TooLarge {
            size: raw.len(),
            limit,
        });
    }

    let value: Value = serde_json::from_slice(raw)?;
    parse_value(value)
}

/// Same as [`parse_message`] for a body that is already decoded.
pub fn parse_value(value: Value) -> Result<BoundaryMessage, BoundaryError> {
    let Value::Object(mut message) = value else {
        return Err(BoundaryError::NotAnObject);
    };

    let kind = match message.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(BoundaryError::MissingType),
    };
    if kind != SAVE_WORKSHEET_DATA {
        tracing::debug!(kind = %kind, "ignoring boundary message");
        return Ok(BoundaryMessage::Ignored(kind));
    }

    let Some(Value::Object(payload)) = message.remove("payload") else {
        return Err(BoundaryError::PayloadNotObject);
    };

    let (snapshot, dropped) = sanitize(payload)?;
    if !dropped.is_empty() {
        tracing::warn!(dropped = ?dropped, "dropped malformed entries from worksheet snapshot");
    }
    Ok(BoundaryMessage::SaveWorksheetData { snapshot, dropped })
}

fn object_field(
    payload: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Map<String, Value>, BoundaryError> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(BoundaryError::FieldNotObject(key)),
    }
}

fn sanitize(mut payload: Map<String, Value>) -> Result<(Snapshot, Vec<String>), BoundaryError> {
    let mut snapshot = Snapshot::default();
    let mut dropped = Vec::new();

    for (id, value) in object_field(&mut payload, "inputs")? {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                dropped.push(format!("inputs.{id}"));
                continue;
            }
        };
        snapshot.inputs.insert(id, text);
    }

    for (id, value) in object_field(&mut payload, "interactiveStates")? {
        match serde_json::from_value::<TaskState>(value) {
            Ok(state) => {
                snapshot.interactive_states.insert(id, state);
            }
            Err(_) => dropped.push(format!("interactiveStates.{id}")),
        }
    }

    if let Some(metrics) = payload.remove("engagementMetrics") {
        if !metrics.is_null() {
            match serde_json::from_value::<EngagementMetrics>(metrics) {
                Ok(m) => snapshot.engagement_metrics = Some(m),
                Err(_) => dropped.push("engagementMetrics".to_string()),
            }
        }
    }

    Ok((snapshot, dropped))
}
