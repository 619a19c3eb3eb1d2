//! Producer update payloads that the relay caches.
//!
//! Parsing is a tolerant reader: unknown `type` values and payloads missing
//! required fields are surfaced as variants rather than errors, since the
//! relay must still forward them.

use std::collections::HashMap;

use serde_json::{Value, json};

/// Integer node identifier assigned by the inspected runtime.
pub type NodeId = i64;

pub const UPDATE_ROOT: &str = "UPDATE_ROOT";
pub const UPDATE_DOCUMENT: &str = "UPDATE_DOCUMENT";
pub const UPDATE_STYLES: &str = "UPDATE_STYLES";

/// A producer update as seen by the state cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheUpdate {
    /// New inspection root together with its styles.
    Root {
        node_id: NodeId,
        node: Value,
        styles: Value,
    },
    /// Full document tree.
    Document { nodes: Value },
    /// Fresh styles for some set of nodes.
    Styles { updated: HashMap<NodeId, Value> },
    /// A `type` the cache does not track.
    Unknown { update_type: Option<String> },
    /// A known `type` missing a required field.
    Malformed {
        update_type: &'static str,
        missing: &'static str,
    },
}

impl CacheUpdate {
    /// Parse an update body (the payload without its correlation id).
    pub fn parse(body: &Value) -> Self {
        let Some(update_type) = body.get("type").and_then(Value::as_str) else {
            return Self::Unknown { update_type: None };
        };

        match update_type {
            UPDATE_ROOT => parse_root(body),
            UPDATE_DOCUMENT => parse_document(body),
            UPDATE_STYLES => parse_styles(body),
            other => Self::Unknown {
                update_type: Some(other.to_string()),
            },
        }
    }

    /// Build the wire body for this update, used for synthetic catch-up
    /// messages.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Root {
                node_id,
                node,
                styles,
            } => json!({
                "type": UPDATE_ROOT,
                "nodeId": node_id,
                "node": node,
                "styles": styles,
            }),
            Self::Document { nodes } => json!({
                "type": UPDATE_DOCUMENT,
                "nodes": nodes,
            }),
            Self::Styles { updated } => {
                let updated: serde_json::Map<String, Value> = updated
                    .iter()
                    .map(|(id, styles)| (id.to_string(), styles.clone()))
                    .collect();
                json!({
                    "type": UPDATE_STYLES,
                    "updated": updated,
                })
            }
            Self::Unknown { update_type } => match update_type {
                Some(t) => json!({ "type": t }),
                None => json!({}),
            },
            Self::Malformed { update_type, .. } => json!({ "type": update_type }),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Root { .. } => UPDATE_ROOT,
            Self::Document { .. } => UPDATE_DOCUMENT,
            Self::Styles { .. } => UPDATE_STYLES,
            Self::Unknown { update_type } => update_type.as_deref().unwrap_or("<none>"),
            Self::Malformed { update_type, .. } => *update_type,
        }
    }
}

fn parse_root(body: &Value) -> CacheUpdate {
    let Some(node_id) = body.get("nodeId").and_then(Value::as_i64) else {
        return CacheUpdate::Malformed {
            update_type: UPDATE_ROOT,
            missing: "nodeId",
        };
    };

    CacheUpdate::Root {
        node_id,
        node: body.get("node").cloned().unwrap_or(Value::Null),
        styles: body.get("styles").cloned().unwrap_or(Value::Null),
    }
}

fn parse_document(body: &Value) -> CacheUpdate {
    match body.get("nodes") {
        Some(nodes) if !nodes.is_null() => CacheUpdate::Document {
            nodes: nodes.clone(),
        },
        _ => CacheUpdate::Malformed {
            update_type: UPDATE_DOCUMENT,
            missing: "nodes",
        },
    }
}

fn parse_styles(body: &Value) -> CacheUpdate {
    let Some(map) = body.get("updated").and_then(Value::as_object) else {
        return CacheUpdate::Malformed {
            update_type: UPDATE_STYLES,
            missing: "updated",
        };
    };

    // Keys are node ids rendered as JSON object keys; skip anything else.
    let updated = map
        .iter()
        .filter_map(|(key, styles)| {
            key.trim()
                .parse::<NodeId>()
                .ok()
                .map(|id| (id, styles.clone()))
        })
        .collect();

    CacheUpdate::Styles { updated }
}
