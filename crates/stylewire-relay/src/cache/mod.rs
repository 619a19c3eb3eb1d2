//! Authoritative snapshot of the producer's last-known state.

mod state;

pub use state::{CacheEffect, CacheSummary, InspectedNode, StateCache};
