//! HTTP/WebSocket surface of the relay.
//!
//! - `GET /browsers` upgrades to a producer session
//! - `GET /apps` upgrades to a consumer session
//! - `GET /health` reports session counts and cache state

pub mod health;
pub mod ws;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

use crate::hub::HubHandle;

/// Shared state handed to every axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub hub: HubHandle,
}

/// Build the axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/browsers", get(ws::producer_ws))
        .route("/apps", get(ws::consumer_ws))
        .route("/health", get(health::health))
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    hub: HubHandle,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, hub, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    hub: HubHandle,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "Relay listening");

    axum::serve(listener, build_router(AppState { hub }))
        .with_graceful_shutdown(shutdown)
        .await
}
