//! `Stylewire` Core Library
//!
//! Shared functionality for `Stylewire` components:
//! - Wire protocol (frames, messages, cache updates, session roles)
//! - Request payload constructors for inspector actions
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod actions;
pub mod config;
pub mod error;
pub mod protocol;
pub mod tracing_init;

pub use actions::{Action, NodeIdInput};
pub use config::Config;
pub use error::{Error, Result};
