//! Stylewire Relay Server
//!
//! WebSocket relay between the inspected browser (producer) and the
//! inspector UIs (consumers).

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use stylewire_core::config::load_config;
use stylewire_core::tracing_init::{init_tracing, relay_filter};

use stylewire_relay::hub::RelayHub;
use stylewire_relay::ids::UuidGenerator;
use stylewire_relay::router::PayloadLog;
use stylewire_relay::server;

#[derive(Parser, Debug)]
#[command(name = "stylewire-relay")]
#[command(
    version,
    about = "Stylewire relay server - routes inspector traffic between browser and UIs"
)]
struct Args {
    /// Host to bind. Overrides config and `STYLEWIRE_HOST`.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on. Overrides config and `STYLEWIRE_PORT`.
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding `.stylewire/settings.json` (defaults to cwd).
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Log level for relay crates.
    #[arg(long)]
    log_level: Option<String>,

    /// Log full routed payloads instead of a preview.
    #[arg(long)]
    log_payloads: bool,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let project_dir = match args.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut config = load_config(Some(&project_dir))?;

    if let Some(host) = args.host {
        config.relay.host = host;
    }
    if let Some(port) = args.port {
        config.relay.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.logging.log_payloads |= args.log_payloads;
    config.logging.json |= args.log_json;

    init_tracing(&relay_filter(&config.logging.level), config.logging.json);

    let addr = config.relay.bind_addr()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        log_payloads = config.logging.log_payloads,
        "Starting stylewire-relay"
    );

    let hub = RelayHub::new(PayloadLog::from(&config.logging), Box::new(UuidGenerator));
    let (handle, hub_task) = hub.spawn();

    server::serve(addr, handle, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal");
    })
    .await?;

    hub_task.abort();
    info!("Relay stopped");
    Ok(())
}
