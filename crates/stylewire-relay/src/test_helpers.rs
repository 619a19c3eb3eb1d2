//! Shared test helpers for relay unit tests.

use stylewire_core::protocol::{CorrelationId, Message, Session};

use crate::ids::IdGenerator;
use crate::router::Outbound;
use crate::state::RelayState;

/// Deterministic ids: `id-1`, `id-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> CorrelationId {
        self.next += 1;
        CorrelationId::new(format!("id-{}", self.next))
    }
}

/// Records every delivery instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct RecordingOutbound {
    deliveries: Vec<(Session, Message)>,
}

impl RecordingOutbound {
    pub fn deliveries(&self) -> &[(Session, Message)] {
        &self.deliveries
    }

    /// Messages delivered to one session, in order.
    pub fn to(&self, session: &Session) -> Vec<Message> {
        self.deliveries
            .iter()
            .filter(|(to, _)| to == session)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.deliveries.clear();
    }
}

impl Outbound for RecordingOutbound {
    fn deliver(&mut self, to: &Session, message: &Message) {
        self.deliveries.push((to.clone(), message.clone()));
    }
}

/// Relay state with sequential ids.
pub fn test_state() -> RelayState {
    RelayState::new(Box::new(SequentialIds::default()))
}
