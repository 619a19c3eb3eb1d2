//! Message routing between the producer and the consumer fan-out.

mod forwarder;
mod outbound;

pub use forwarder::{MessageRouter, PayloadLog, RouteOutcome, RouterError};
pub use outbound::{ChannelOutbound, Outbound};
