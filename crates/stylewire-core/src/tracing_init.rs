//! Logging setup for the `stylewire-relay` binary.
//!
//! The level comes from `logging.level` (scoped to the stylewire crates by
//! [`relay_filter`]) unless `RUST_LOG` is set; `logging.json` switches to
//! structured JSON lines.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"stylewire_relay=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Level filter string for a configured log level, scoped to the relay crates.
pub fn relay_filter(level: &str) -> String {
    format!("stylewire_relay={level},stylewire_core={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_filter_scopes_both_crates() {
        assert_eq!(
            relay_filter("debug"),
            "stylewire_relay=debug,stylewire_core=debug"
        );
    }
}
