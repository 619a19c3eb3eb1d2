//! Stylewire Relay Server Library
//!
//! Core functionality for the Stylewire relay:
//! - Connection registry for producer and consumer sessions
//! - State cache with catch-up snapshots for late consumers
//! - Message routing between the producer and consumer fan-out
//! - Session lifecycle (registration, catch-up, invalidation)
//! - Single-task hub serialising all relay events
//! - WebSocket and health endpoints

pub mod cache;
pub mod hub;
pub mod ids;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
