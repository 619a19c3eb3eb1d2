//! Tracking of live producer and consumer sessions.

mod connection;

pub use connection::{ConnectionRegistry, RegistryError, SessionCounts};
