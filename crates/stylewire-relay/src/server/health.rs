//! `GET /health`: liveness plus a snapshot of relay state.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::AppState;
use crate::state::RelayStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub relay: RelayStatus,
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.hub.status().await {
        Ok(relay) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                relay,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unavailable", "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hub::RelayHub;
    use crate::ids::UuidGenerator;
    use crate::router::PayloadLog;
    use stylewire_core::protocol::Session;
    use tokio::sync::mpsc;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (hub, _task) = RelayHub::new(PayloadLog::default(), Box::new(UuidGenerator)).spawn();
        let (tx, _rx) = mpsc::unbounded_channel();
        hub.connect(Session::consumer("c1"), tx).await.unwrap();

        let response = health(State(AppState { hub })).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["producers"], 0);
        assert_eq!(body["consumers"], 1);
        assert_eq!(body["inspectedNodeId"], serde_json::Value::Null);
        assert_eq!(body["hasDocument"], false);
    }

    #[tokio::test]
    async fn health_unavailable_when_hub_stopped() {
        let (hub, task) = RelayHub::new(PayloadLog::default(), Box::new(UuidGenerator)).spawn();
        task.abort();
        let _ = task.await;

        let response = health(State(AppState { hub })).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
