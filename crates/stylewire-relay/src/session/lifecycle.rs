//! Session lifecycle: `Disconnected -> Connected -> Disconnected`.
//!
//! A reconnect is always a new session id, so there is no
//! `Connected -> Connected` transition.

use tracing::{info, warn};

use stylewire_core::protocol::{Role, Session};

use crate::registry::{RegistryError, SessionCounts};
use crate::router::Outbound;
use crate::state::RelayState;

/// Drives registry and cache changes for connect/disconnect events.
///
/// Registry violations are logged and returned; they never take the relay
/// down.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionLifecycle;

impl SessionLifecycle {
    pub const fn new() -> Self {
        Self
    }

    /// Register a newly connected session.
    ///
    /// A consumer is then sent the catch-up snapshot (inspected node first,
    /// then document), each message with a fresh correlation id, to that
    /// consumer only.
    pub fn on_connect(
        &self,
        session: &Session,
        state: &mut RelayState,
        out: &mut dyn Outbound,
    ) -> Result<SessionCounts, RegistryError> {
        let counts = state
            .registry
            .register(session.id.clone(), session.role)
            .inspect_err(|e| warn!(session = %session, error = %e, "Refusing connection"))?;

        info!(
            session_id = %session.id,
            role = %session.role,
            producers = counts.producers,
            consumers = counts.consumers,
            "Session connected"
        );

        if session.role == Role::Consumer {
            let mut sent = 0usize;
            for mut message in state.cache.snapshot_for_catch_up() {
                message.correlation_id = Some(state.ids.next_id());
                out.deliver(session, &message);
                sent += 1;
            }
            if sent > 0 {
                info!(session_id = %session.id, messages = sent, "Sent catch-up snapshot");
            }
        }

        Ok(counts)
    }

    /// Unregister a disconnected session.
    ///
    /// When the producer leaves, the inspected node is dropped from the
    /// cache; the document is kept.
    pub fn on_disconnect(
        &self,
        session: &Session,
        state: &mut RelayState,
    ) -> Result<SessionCounts, RegistryError> {
        let counts = state
            .registry
            .unregister(&session.id, session.role)
            .inspect_err(|e| warn!(session = %session, error = %e, "Disconnect for unknown session"))?;

        info!(
            session_id = %session.id,
            role = %session.role,
            producers = counts.producers,
            consumers = counts.consumers,
            "Session disconnected"
        );

        if session.role == Role::Producer {
            state.cache.on_producer_disconnect();
        }

        Ok(counts)
    }
}
