//! Relay-level messages and their mapping onto wire frames.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::frame::{Frame, FrameError};
use super::session::Role;

/// Diagnostic carried by a router error when no producer is connected.
pub const NO_PRODUCER_MESSAGE: &str = "no available producer";

/// `type` field of a router error payload.
pub const ROUTER_ERROR_TYPE: &str = "SERVER_ERROR";

const ID_FIELD: &str = "id";

/// What a message is, which also fixes its wire event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
    Update,
    ProducerError,
    RouterError,
}

impl MessageKind {
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Request => "data.req",
            Self::Response => "data.res",
            Self::Update => "data.update",
            Self::ProducerError => "data.err",
            Self::RouterError => "server.err",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "data.req" => Some(Self::Request),
            "data.res" => Some(Self::Response),
            "data.update" => Some(Self::Update),
            "data.err" => Some(Self::ProducerError),
            "server.err" => Some(Self::RouterError),
            _ => None,
        }
    }

    /// The role allowed to originate this kind, `None` for relay-generated kinds.
    pub const fn origin(self) -> Option<Role> {
        match self {
            Self::Request => Some(Role::Consumer),
            Self::Response | Self::Update | Self::ProducerError => Some(Role::Producer),
            Self::RouterError => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Identifier linking a request to its reply, or tagging an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A tagged payload flowing through the relay.
///
/// `body` is the wire payload without its `id` field. Only string ids are
/// treated as correlation ids; any other `id` value stays in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub correlation_id: Option<CorrelationId>,
    pub body: Value,
}

impl Message {
    pub const fn new(kind: MessageKind, body: Value) -> Self {
        Self {
            kind,
            correlation_id: None,
            body,
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// The error sent to consumers when a request cannot reach a producer.
    pub fn router_error(correlation_id: Option<CorrelationId>) -> Self {
        Self {
            kind: MessageKind::RouterError,
            correlation_id,
            body: json!({
                "type": ROUTER_ERROR_TYPE,
                "message": NO_PRODUCER_MESSAGE,
            }),
        }
    }

    /// The `type` field of the body, if any.
    pub fn payload_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }

    pub fn from_frame(frame: Frame) -> Result<Self, FrameError> {
        let kind = MessageKind::from_event_name(&frame.event)
            .ok_or(FrameError::UnknownEvent(frame.event))?;

        let (correlation_id, body) = match frame.data {
            Value::Object(mut map) => {
                let correlation_id = match map.get(ID_FIELD) {
                    Some(Value::String(id)) => Some(CorrelationId::new(id.clone())),
                    _ => None,
                };
                if correlation_id.is_some() {
                    map.remove(ID_FIELD);
                }
                (correlation_id, Value::Object(map))
            }
            other => (None, other),
        };

        Ok(Self {
            kind,
            correlation_id,
            body,
        })
    }

    /// Whether a correlation id can be stamped onto this message's payload.
    ///
    /// Only object payloads without an `id` field qualify.
    pub fn can_take_correlation_id(&self) -> bool {
        self.body
            .as_object()
            .is_some_and(|map| !map.contains_key(ID_FIELD))
    }

    /// Wire frame for this message.
    ///
    /// The correlation id goes back into an object payload unless the payload
    /// already has an `id`. Non-object payloads are carried verbatim.
    pub fn to_frame(&self) -> Frame {
        let data = match (&self.body, &self.correlation_id) {
            (Value::Object(map), Some(id)) if !map.contains_key(ID_FIELD) => {
                let mut map = map.clone();
                map.insert(ID_FIELD.into(), Value::String(id.to_string()));
                Value::Object(map)
            }
            (body, _) => body.clone(),
        };
        Frame::new(self.kind.event_name(), data)
    }

    /// Decode a socket text frame.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        Self::from_frame(Frame::parse(text)?)
    }

    /// Encode as a socket text frame.
    pub fn encode(&self) -> Result<String, FrameError> {
        self.to_frame().to_json()
    }
}
