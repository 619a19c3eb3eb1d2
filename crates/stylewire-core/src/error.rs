//! Error types for `Stylewire` core library.

use thiserror::Error;

/// Result type alias using `Stylewire` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Stylewire` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Node id could not be coerced to an integer
    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
