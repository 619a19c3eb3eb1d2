//! Wire protocol shared by producers, consumers, and the relay.
//!
//! Every WebSocket text frame is a JSON object `{"event": ..., "data": ...}`.
//! The correlation id of a message travels inside `data` as its `id` field.

mod frame;
mod message;
mod session;
mod update;

pub use frame::{Frame, FrameError};
pub use message::{CorrelationId, Message, MessageKind, NO_PRODUCER_MESSAGE, ROUTER_ERROR_TYPE};
pub use session::{Role, Session, SessionId};
pub use update::{CacheUpdate, NodeId, UPDATE_DOCUMENT, UPDATE_ROOT, UPDATE_STYLES};
