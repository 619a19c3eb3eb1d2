//! Session connect/disconnect orchestration.

mod lifecycle;

pub use lifecycle::SessionLifecycle;
