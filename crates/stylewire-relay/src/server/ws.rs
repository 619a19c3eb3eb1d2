//! WebSocket session handling: one task per socket.

use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use stylewire_core::protocol::{Role, Session, SessionId};

use super::AppState;
use crate::hub::HubHandle;

/// Upgrade handler for the producer endpoint.
pub async fn producer_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Role::Producer, state.hub))
}

/// Upgrade handler for the consumer endpoint.
pub async fn consumer_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Role::Consumer, state.hub))
}

/// Drive one socket: register it, pump frames both ways, unregister on close.
pub async fn handle_socket(socket: WebSocket, role: Role, hub: HubHandle) {
    let session = Session::new(SessionId::new(uuid::Uuid::new_v4().to_string()), role);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    // Catch-up frames are queued on `out_tx` before this returns.
    if let Err(e) = hub.connect(session.clone(), out_tx).await {
        warn!(session = %session, error = %e, "Connection refused");
        return;
    }

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer_session = session.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                debug!(session = %writer_session, "Socket closed while writing");
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(WsMessage::Text(text)) => {
                if hub.inbound(session.clone(), text.as_str().to_owned()).is_err() {
                    break;
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(WsMessage::Binary(_)) => {
                warn!(session = %session, "Ignoring binary frame");
            }
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => {}
            Err(e) => {
                debug!(session = %session, error = %e, "Socket read error");
                break;
            }
        }
    }

    if hub.disconnect(session.clone()).is_err() {
        debug!(session = %session, "Hub gone before disconnect");
    }
    writer.abort();
    info!(session = %session, "Socket closed");
}
