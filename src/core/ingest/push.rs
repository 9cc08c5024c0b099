//! HTTP push listener.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::core::thermal::{HealthResponse, Pipeline, Snapshot};
use crate::error::{HubError, Result};

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/thermal-data", post(receive_snapshot))
        .route("/health", get(health))
        .route("/rate-limits/reset", post(reset_rate_limits))
        .with_state(pipeline)
}

/// Serve until the shutdown channel fires, then drain in-flight requests.
pub async fn serve(
    pipeline: Arc<Pipeline>,
    addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            log::info!("HTTP server shutting down");
        })
        .await?;

    Ok(())
}

async fn receive_snapshot(State(pipeline): State<Arc<Pipeline>>, body: Bytes) -> Response {
    let snapshot = match Snapshot::from_json_slice(&body) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::error!("Rejected pushed thermal data: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match pipeline.submit(snapshot).await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(HubError::ShuttingDown) => {
            (StatusCode::SERVICE_UNAVAILABLE, "shutting down").into_response()
        }
        Err(e) => {
            log::error!("Error processing pushed thermal data: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health(State(pipeline): State<Arc<Pipeline>>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(pipeline.status().await))
}

async fn reset_rate_limits(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    pipeline.dispatcher().reset();
    Json(json!({ "status": "reset" }))
}
