//! Relay state owned by the hub task.

use serde::Serialize;

use stylewire_core::protocol::{CorrelationId, NodeId};

use crate::cache::StateCache;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::registry::ConnectionRegistry;

/// Everything the router and lifecycle read and mutate.
///
/// One instance per relay, passed by reference; never a global.
pub struct RelayState {
    pub registry: ConnectionRegistry,
    pub cache: StateCache,
    pub(crate) ids: Box<dyn IdGenerator>,
}

impl RelayState {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            cache: StateCache::new(),
            ids,
        }
    }

    pub fn fresh_correlation_id(&mut self) -> CorrelationId {
        self.ids.next_id()
    }

    pub fn status(&self) -> RelayStatus {
        let counts = self.registry.counts();
        let cache = self.cache.summary();
        RelayStatus {
            producers: counts.producers,
            consumers: counts.consumers,
            inspected_node_id: cache.inspected_node_id,
            has_document: cache.has_document,
        }
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(Box::new(UuidGenerator))
    }
}

/// Point-in-time view of the relay, reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub producers: usize,
    pub consumers: usize,
    pub inspected_node_id: Option<NodeId>,
    pub has_document: bool,
}
