//! Inspected-node and document cache with merge rules for partial updates.

use serde::Serialize;
use serde_json::Value;

use stylewire_core::protocol::{CacheUpdate, Message, MessageKind, NodeId};

/// The node currently under inspection, with its computed styles.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectedNode {
    pub node_id: NodeId,
    pub node: Value,
    pub styles: Value,
}

/// What an applied update did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEffect {
    InspectedReplaced { node_id: NodeId },
    DocumentReplaced,
    StylesMerged { node_id: NodeId },
    Unchanged,
}

/// Cheap view of the cache for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSummary {
    pub inspected_node_id: Option<NodeId>,
    pub has_document: bool,
}

/// Snapshot of the producer's state, owned by the hub.
///
/// Starts empty. `inspected` is cleared when the producer goes away;
/// `document_nodes` survives so a reconnecting producer's consumers still see
/// the last document.
#[derive(Debug, Default)]
pub struct StateCache {
    inspected: Option<InspectedNode>,
    document_nodes: Option<Value>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn inspected(&self) -> Option<&InspectedNode> {
        self.inspected.as_ref()
    }

    pub const fn document_nodes(&self) -> Option<&Value> {
        self.document_nodes.as_ref()
    }

    pub fn apply_update(&mut self, update: CacheUpdate) -> CacheEffect {
        match update {
            CacheUpdate::Root {
                node_id,
                node,
                styles,
            } => {
                self.inspected = Some(InspectedNode {
                    node_id,
                    node,
                    styles,
                });
                CacheEffect::InspectedReplaced { node_id }
            }
            CacheUpdate::Document { nodes } => {
                self.document_nodes = Some(nodes);
                CacheEffect::DocumentReplaced
            }
            CacheUpdate::Styles { mut updated } => {
                let Some(inspected) = self.inspected.as_mut() else {
                    return CacheEffect::Unchanged;
                };
                match updated.remove(&inspected.node_id) {
                    Some(styles) => {
                        inspected.styles = styles;
                        CacheEffect::StylesMerged {
                            node_id: inspected.node_id,
                        }
                    }
                    None => CacheEffect::Unchanged,
                }
            }
            CacheUpdate::Unknown { .. } | CacheUpdate::Malformed { .. } => CacheEffect::Unchanged,
        }
    }

    /// Synthetic updates that bring a new consumer up to date.
    ///
    /// Yields a ROOT update if a node is inspected, then a DOCUMENT update if
    /// a document is cached. Messages carry no correlation id; the caller
    /// stamps each one.
    pub fn snapshot_for_catch_up(&self) -> impl Iterator<Item = Message> + '_ {
        let root = self.inspected.iter().map(|inspected| {
            CacheUpdate::Root {
                node_id: inspected.node_id,
                node: inspected.node.clone(),
                styles: inspected.styles.clone(),
            }
            .to_body()
        });
        let document = self
            .document_nodes
            .iter()
            .map(|nodes| CacheUpdate::Document {
                nodes: nodes.clone(),
            }
            .to_body());

        root.chain(document)
            .map(|body| Message::new(MessageKind::Update, body))
    }

    pub fn on_producer_disconnect(&mut self) {
        self.inspected = None;
    }

    /// Back to the initial, empty state.
    pub fn reset(&mut self) {
        self.inspected = None;
        self.document_nodes = None;
    }

    pub fn summary(&self) -> CacheSummary {
        CacheSummary {
            inspected_node_id: self.inspected.as_ref().map(|i| i.node_id),
            has_document: self.document_nodes.is_some(),
        }
    }
}
