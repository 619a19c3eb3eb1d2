//! The relay hub: one task owning all relay state.
//!
//! Connect, disconnect, and inbound-message events from every socket are
//! queued onto a single channel and handled one at a time, each to
//! completion. Nothing awaits inside a handler, so a consumer's catch-up is
//! delivered before any later event (such as a live update) is looked at.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use stylewire_core::protocol::{Message, Session};

use crate::ids::IdGenerator;
use crate::registry::{RegistryError, SessionCounts};
use crate::router::{ChannelOutbound, MessageRouter, PayloadLog};
use crate::session::SessionLifecycle;
use crate::state::{RelayState, RelayStatus};

/// Events fed to the hub by the transport.
#[derive(Debug)]
pub enum HubEvent {
    Connected {
        session: Session,
        outbound: mpsc::UnboundedSender<String>,
        reply: oneshot::Sender<Result<SessionCounts, RegistryError>>,
    },
    Disconnected {
        session: Session,
    },
    Inbound {
        session: Session,
        text: String,
    },
    Status {
        reply: oneshot::Sender<RelayStatus>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Relay hub has shut down")]
    Closed,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Cloneable handle for submitting events to the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    /// Announce a new session and attach its outbound channel.
    ///
    /// Resolves once the hub has registered the session and queued any
    /// catch-up messages onto `outbound`.
    pub async fn connect(
        &self,
        session: Session,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Result<SessionCounts, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Connected {
            session,
            outbound,
            reply,
        })?;
        rx.await
            .map_err(|_| HubError::Closed)?
            .map_err(HubError::from)
    }

    pub fn disconnect(&self, session: Session) -> Result<(), HubError> {
        self.send(HubEvent::Disconnected { session })
    }

    /// Queue a raw text frame received from `session`.
    pub fn inbound(&self, session: Session, text: String) -> Result<(), HubError> {
        self.send(HubEvent::Inbound { session, text })
    }

    pub async fn status(&self) -> Result<RelayStatus, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Status { reply })?;
        rx.await.map_err(|_| HubError::Closed)
    }

    fn send(&self, event: HubEvent) -> Result<(), HubError> {
        self.tx.send(event).map_err(|_| HubError::Closed)
    }
}

/// Owner of registry, cache, router, and per-session outbound channels.
pub struct RelayHub {
    state: RelayState,
    router: MessageRouter,
    lifecycle: SessionLifecycle,
    outbound: ChannelOutbound,
}

impl RelayHub {
    pub fn new(payload_log: PayloadLog, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            state: RelayState::new(ids),
            router: MessageRouter::new(payload_log),
            lifecycle: SessionLifecycle::new(),
            outbound: ChannelOutbound::new(),
        }
    }

    /// Start the hub task. It stops once every [`HubHandle`] is dropped.
    pub fn spawn(self) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (HubHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<HubEvent>) {
        info!("Relay hub started");
        while let Some(event) = rx.recv().await {
            self.handle(event);
        }
        info!("Relay hub stopped");
    }

    /// Handle a single event to completion.
    pub fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected {
                session,
                outbound,
                reply,
            } => {
                let result = self.on_connected(&session, outbound);
                if reply.send(result).is_err() {
                    debug!(session = %session, "Connect caller went away");
                }
            }
            HubEvent::Disconnected { session } => self.on_disconnected(&session),
            HubEvent::Inbound { session, text } => self.on_inbound(&session, &text),
            HubEvent::Status { reply } => {
                if reply.send(self.state.status()).is_err() {
                    debug!("Status caller went away");
                }
            }
        }
    }

    fn on_connected(
        &mut self,
        session: &Session,
        tx: mpsc::UnboundedSender<String>,
    ) -> Result<SessionCounts, RegistryError> {
        let attached = self.outbound.attach(session.clone(), tx);
        let result = self
            .lifecycle
            .on_connect(session, &mut self.state, &mut self.outbound);
        if result.is_err() && attached {
            self.outbound.detach(session);
        }
        result
    }

    fn on_disconnected(&mut self, session: &Session) {
        if self
            .lifecycle
            .on_disconnect(session, &mut self.state)
            .is_ok()
        {
            self.outbound.detach(session);
        }
    }

    fn on_inbound(&mut self, session: &Session, text: &str) {
        if !self.state.registry.contains(&session.id, session.role) {
            warn!(session = %session, "Dropping frame from unregistered session");
            return;
        }

        let message = match Message::decode(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(session = %session, error = %e, "Dropping undecodable frame");
                return;
            }
        };

        match self
            .router
            .route(session, &mut self.state, &mut self.outbound, message)
        {
            Ok(outcome) => debug!(session = %session, ?outcome, "Routed message"),
            Err(e) => warn!(session = %session, error = %e, "Dropping message"),
        }
    }
}
