//! Message router: producer events fan out to consumers, consumer requests go
//! to the producer.

use tracing::{Level, debug, info, warn};

use stylewire_core::config::LoggingConfig;
use stylewire_core::protocol::{CacheUpdate, Message, MessageKind, Role, Session};

use super::outbound::Outbound;
use crate::cache::CacheEffect;
use crate::state::RelayState;

/// How routed payloads show up in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLog {
    /// Log whole payloads instead of a preview.
    pub full: bool,
    /// Characters kept in the preview.
    pub preview_len: usize,
}

impl Default for PayloadLog {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for PayloadLog {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            full: config.log_payloads,
            preview_len: config.payload_preview_len,
        }
    }
}

impl PayloadLog {
    fn render(&self, message: &Message) -> String {
        let text = message.to_frame().data.to_string();
        if self.full || text.chars().count() <= self.preview_len {
            return text;
        }
        let mut preview: String = text.chars().take(self.preview_len).collect();
        preview.push_str("...");
        preview
    }
}

/// Where a routed message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Broadcast to every connected consumer.
    Broadcast { consumers: usize },
    /// Forwarded to the producer.
    Forwarded { producers: usize },
    /// No producer connected; a router error went to every consumer instead.
    NoProducerAvailable { consumers: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("{kind} is not accepted from a {role}")]
    UnexpectedMessage { kind: MessageKind, role: Role },
}

/// Routes messages between the producer and consumers.
#[derive(Debug, Clone, Default)]
pub struct MessageRouter {
    payload_log: PayloadLog,
}

impl MessageRouter {
    pub const fn new(payload_log: PayloadLog) -> Self {
        Self { payload_log }
    }

    /// Route a message received from `from`.
    pub fn route(
        &self,
        from: &Session,
        state: &mut RelayState,
        out: &mut dyn Outbound,
        message: Message,
    ) -> Result<RouteOutcome, RouterError> {
        match from.role {
            Role::Producer => self.route_from_producer(state, out, message),
            Role::Consumer => self.route_from_consumer(state, out, message),
        }
    }

    /// Handle a producer response, update, or error.
    ///
    /// Updates are applied to the cache and stamped with a fresh correlation
    /// id when their object payload has no `id` field at all. Everything is broadcast to all
    /// consumers, including responses: consumers filter by correlation id.
    pub fn route_from_producer(
        &self,
        state: &mut RelayState,
        out: &mut dyn Outbound,
        mut message: Message,
    ) -> Result<RouteOutcome, RouterError> {
        match message.kind {
            MessageKind::Update => {
                let update = CacheUpdate::parse(&message.body);
                if let CacheUpdate::Malformed {
                    update_type,
                    missing,
                } = &update
                {
                    warn!(update_type, missing, "Malformed update, cache left unchanged");
                }
                let update_type = update.type_name().to_string();
                match state.cache.apply_update(update) {
                    CacheEffect::InspectedReplaced { node_id } => {
                        info!(node_id, "Inspecting node");
                    }
                    CacheEffect::DocumentReplaced => info!("Updated document nodes"),
                    CacheEffect::StylesMerged { node_id } => {
                        info!(node_id, "Updated styles for inspected node");
                    }
                    CacheEffect::Unchanged => {
                        debug!(update_type = %update_type, "Update did not change cache");
                    }
                }
                if message.correlation_id.is_none() && message.can_take_correlation_id() {
                    message.correlation_id = Some(state.fresh_correlation_id());
                }
            }
            MessageKind::Response => {}
            MessageKind::ProducerError => {
                warn!(
                    correlation_id = ?message.correlation_id,
                    "Producer reported an error"
                );
            }
            kind @ (MessageKind::Request | MessageKind::RouterError) => {
                return Err(RouterError::UnexpectedMessage {
                    kind,
                    role: Role::Producer,
                });
            }
        }

        let consumers = state.registry.sessions(Role::Consumer);
        self.log_routed(&message, Role::Consumer, consumers.len());
        out.broadcast(&consumers, &message);
        Ok(RouteOutcome::Broadcast {
            consumers: consumers.len(),
        })
    }

    /// Handle a consumer request.
    ///
    /// Forwarded verbatim when a producer is connected. Otherwise every
    /// consumer gets a router error carrying the request's correlation id and
    /// the request is dropped.
    pub fn route_from_consumer(
        &self,
        state: &RelayState,
        out: &mut dyn Outbound,
        request: Message,
    ) -> Result<RouteOutcome, RouterError> {
        if request.kind != MessageKind::Request {
            return Err(RouterError::UnexpectedMessage {
                kind: request.kind,
                role: Role::Consumer,
            });
        }

        if state.registry.has_any(Role::Producer) {
            let producers = state.registry.sessions(Role::Producer);
            self.log_routed(&request, Role::Producer, producers.len());
            out.broadcast(&producers, &request);
            return Ok(RouteOutcome::Forwarded {
                producers: producers.len(),
            });
        }

        let consumers = state.registry.sessions(Role::Consumer);
        warn!(
            correlation_id = ?request.correlation_id,
            consumers = consumers.len(),
            "No available producer, answering request with router error"
        );
        let error = Message::router_error(request.correlation_id);
        out.broadcast(&consumers, &error);
        Ok(RouteOutcome::NoProducerAvailable {
            consumers: consumers.len(),
        })
    }

    fn log_routed(&self, message: &Message, to: Role, recipients: usize) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        debug!(
            event = message.kind.event_name(),
            payload_type = message.payload_type().unwrap_or("-"),
            to = %to,
            recipients,
            payload = %self.payload_log.render(message),
            "Routing message"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{RecordingOutbound, test_state};
    use serde_json::json;
    use stylewire_core::protocol::CorrelationId;

    fn connect(state: &mut RelayState, session: &Session) {
        state
            .registry
            .register(session.id.clone(), session.role)
            .unwrap();
    }

    fn update(body: serde_json::Value) -> Message {
        Message::new(MessageKind::Update, body)
    }

    #[test]
    fn update_is_cached_stamped_and_broadcast() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::producer("p"));
        connect(&mut state, &Session::consumer("c1"));
        connect(&mut state, &Session::consumer("c2"));

        let router = MessageRouter::default();
        let outcome = router
            .route_from_producer(
                &mut state,
                &mut out,
                update(json!({"type": "UPDATE_ROOT", "nodeId": 5, "node": {}, "styles": {}})),
            )
            .unwrap();

        assert_eq!(outcome, RouteOutcome::Broadcast { consumers: 2 });
        assert_eq!(state.cache.inspected().map(|i| i.node_id), Some(5));
        let to_c1 = out.to(&Session::consumer("c1"));
        let to_c2 = out.to(&Session::consumer("c2"));
        assert_eq!(to_c1.len(), 1);
        assert_eq!(to_c1, to_c2);
        assert_eq!(to_c1[0].correlation_id, Some(CorrelationId::from("id-1")));
        assert!(out.to(&Session::producer("p")).is_empty());
    }

    #[test]
    fn update_keeps_existing_correlation_id() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));

        MessageRouter::default()
            .route_from_producer(
                &mut state,
                &mut out,
                update(json!({"type": "UPDATE_DOCUMENT", "nodes": []})).with_correlation_id("mine"),
            )
            .unwrap();

        let delivered = out.to(&Session::consumer("c1"));
        assert_eq!(delivered[0].correlation_id, Some(CorrelationId::from("mine")));
    }

    #[test]
    fn update_with_non_string_id_is_not_restamped() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));

        let message =
            Message::decode(r#"{"event":"data.update","data":{"id":42,"type":"UPDATE_LAYOUT"}}"#)
                .unwrap();
        MessageRouter::default()
            .route_from_producer(&mut state, &mut out, message)
            .unwrap();

        let delivered = out.to(&Session::consumer("c1"));
        assert_eq!(delivered[0].correlation_id, None);
        assert_eq!(
            delivered[0].to_frame().data,
            json!({"id": 42, "type": "UPDATE_LAYOUT"})
        );
    }

    #[test]
    fn non_object_update_is_forwarded_verbatim() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));

        let message = Message::decode(r#"{"event":"data.update","data":[1,2]}"#).unwrap();
        MessageRouter::default()
            .route_from_producer(&mut state, &mut out, message)
            .unwrap();

        let delivered = out.to(&Session::consumer("c1"));
        assert_eq!(delivered[0].correlation_id, None);
        assert_eq!(delivered[0].to_frame().data, json!([1, 2]));
        assert!(state.cache.inspected().is_none());
    }

    #[test]
    fn unknown_update_is_broadcast_without_touching_cache() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));

        MessageRouter::default()
            .route_from_producer(&mut state, &mut out, update(json!({"type": "UPDATE_LAYOUT"})))
            .unwrap();

        assert_eq!(state.cache.summary().inspected_node_id, None);
        assert!(!state.cache.summary().has_document);
        let delivered = out.to(&Session::consumer("c1"));
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].payload_type(), Some("UPDATE_LAYOUT"));
        assert!(delivered[0].correlation_id.is_some());
    }

    #[test]
    fn response_fans_out_to_every_consumer_unchanged() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::producer("p"));
        for c in ["c1", "c2", "c3"] {
            connect(&mut state, &Session::consumer(c));
        }

        let response = Message::new(MessageKind::Response, json!({"styles": []}))
            .with_correlation_id("r1");
        MessageRouter::default()
            .route_from_producer(&mut state, &mut out, response.clone())
            .unwrap();

        for c in ["c1", "c2", "c3"] {
            assert_eq!(out.to(&Session::consumer(c)), vec![response.clone()]);
        }
    }

    #[test]
    fn producer_error_passes_through() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));

        let err = Message::new(MessageKind::ProducerError, json!({"message": "bad node"}))
            .with_correlation_id("r3");
        MessageRouter::default()
            .route_from_producer(&mut state, &mut out, err.clone())
            .unwrap();

        assert_eq!(out.to(&Session::consumer("c1")), vec![err]);
    }

    #[test]
    fn request_is_forwarded_verbatim_to_producer() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::producer("p"));
        connect(&mut state, &Session::consumer("c1"));

        let request = Message::new(
            MessageKind::Request,
            json!({"type": "REQUEST_STYLE_FOR_NODE", "data": {"nodeId": 5}}),
        )
        .with_correlation_id("r1");
        let outcome = MessageRouter::default()
            .route_from_consumer(&state, &mut out, request.clone())
            .unwrap();

        assert_eq!(outcome, RouteOutcome::Forwarded { producers: 1 });
        assert_eq!(out.to(&Session::producer("p")), vec![request]);
        assert!(out.to(&Session::consumer("c1")).is_empty());
    }

    #[test]
    fn request_without_producer_yields_one_router_error_per_consumer() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::consumer("c1"));
        connect(&mut state, &Session::consumer("c2"));

        let request = Message::new(MessageKind::Request, json!({"type": "PRUNE_NODE"}))
            .with_correlation_id("r2");
        let outcome = MessageRouter::default()
            .route_from_consumer(&state, &mut out, request)
            .unwrap();

        assert_eq!(outcome, RouteOutcome::NoProducerAvailable { consumers: 2 });
        for c in ["c1", "c2"] {
            let delivered = out.to(&Session::consumer(c));
            assert_eq!(delivered.len(), 1);
            assert_eq!(delivered[0].kind, MessageKind::RouterError);
            assert_eq!(delivered[0].correlation_id, Some(CorrelationId::from("r2")));
            assert_eq!(delivered[0].body["message"], "no available producer");
        }
        assert_eq!(out.deliveries().len(), 2);
    }

    #[test]
    fn wrong_direction_messages_are_rejected() {
        let mut state = test_state();
        let mut out = RecordingOutbound::default();
        connect(&mut state, &Session::producer("p"));
        connect(&mut state, &Session::consumer("c1"));
        let router = MessageRouter::default();

        let err = router
            .route_from_producer(
                &mut state,
                &mut out,
                Message::new(MessageKind::Request, json!({})),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::UnexpectedMessage {
                kind: MessageKind::Request,
                role: Role::Producer
            }
        );

        let err = router
            .route(
                &Session::consumer("c1"),
                &mut state,
                &mut out,
                Message::new(MessageKind::Update, json!({"type": "UPDATE_ROOT", "nodeId": 1})),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::UnexpectedMessage {
                role: Role::Consumer,
                ..
            }
        ));
        assert!(state.cache.inspected().is_none());
        assert!(out.deliveries().is_empty());
    }

    #[test]
    fn payload_preview_truncates() {
        let log = PayloadLog {
            full: false,
            preview_len: 10,
        };
        let msg = Message::new(MessageKind::Response, json!({"long": "abcdefghijklmnop"}));
        let rendered = log.render(&msg);
        assert_eq!(rendered.chars().count(), 13);
        assert!(rendered.ends_with("..."));

        let full = PayloadLog {
            full: true,
            preview_len: 10,
        };
        assert_eq!(full.render(&msg), msg.body.to_string());
    }
}
