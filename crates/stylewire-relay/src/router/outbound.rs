//! Delivery of routed messages to sessions.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use stylewire_core::protocol::{Message, Session};

/// Where routed messages go.
///
/// Delivery never blocks: a message for a session that has gone away is
/// dropped.
pub trait Outbound {
    fn deliver(&mut self, to: &Session, message: &Message);

    fn broadcast(&mut self, to: &[Session], message: &Message) {
        for session in to {
            self.deliver(session, message);
        }
    }
}

/// Per-session unbounded channels feeding each socket's writer task.
///
/// Unbounded on purpose: fan-out has no backpressure or slow-consumer policy.
#[derive(Debug, Default)]
pub struct ChannelOutbound {
    senders: HashMap<Session, mpsc::UnboundedSender<String>>,
}

impl ChannelOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session's outbound channel. Returns `false` and keeps the
    /// existing channel if the session is already attached.
    pub fn attach(&mut self, session: Session, tx: mpsc::UnboundedSender<String>) -> bool {
        if self.senders.contains_key(&session) {
            return false;
        }
        self.senders.insert(session, tx);
        true
    }

    /// Detach a session, closing its writer once queued frames drain.
    pub fn detach(&mut self, session: &Session) -> bool {
        self.senders.remove(session).is_some()
    }

    pub fn is_attached(&self, session: &Session) -> bool {
        self.senders.contains_key(session)
    }

    fn send_text(&self, to: &Session, text: String) {
        match self.senders.get(to) {
            Some(tx) => {
                if tx.send(text).is_err() {
                    debug!(session = %to, "Writer gone, dropping frame");
                }
            }
            None => debug!(session = %to, "No outbound channel for session"),
        }
    }
}

impl Outbound for ChannelOutbound {
    fn deliver(&mut self, to: &Session, message: &Message) {
        match message.encode() {
            Ok(text) => self.send_text(to, text),
            Err(e) => warn!(session = %to, error = %e, "Failed to encode message"),
        }
    }

    fn broadcast(&mut self, to: &[Session], message: &Message) {
        // Encode once for the whole fan-out.
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = %message.kind, error = %e, "Failed to encode broadcast");
                return;
            }
        };
        for session in to {
            self.send_text(session, text.clone());
        }
    }
}
