use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use thermal_hub::core::ingest::router;
use thermal_hub::core::thermal::{HealthResponse, Pipeline};
use tower::ServiceExt;

use super::support::pipeline;

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn send(pipeline: &Arc<Pipeline>, request: Request<Body>) -> axum::response::Response {
    router(Arc::clone(pipeline)).oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_valid_snapshot_accepted() {
    let (pipeline, sink) = pipeline();
    let response = send(
        &pipeline,
        post(
            "/thermal-data",
            r#"{"timestamp": 1700000000, "socket_temp": 50, "cpu_temp": 60,
                "fan_active": true, "fan_states": "10000", "cpu_freq": 3400, "load_avg": 0.7}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
    assert_eq!(sink.sensors.lock().len(), 6);
    assert_eq!(sink.titles(), vec!["🌀 Fans Activated"]);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (pipeline, sink) = pipeline();

    for body in ["not json", "[1, 2, 3]", r#"{"cpu_temp": "hot"}"#] {
        let response = send(&pipeline, post("/thermal-data", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    assert!(sink.sensors.lock().is_empty());
    assert_eq!(pipeline.tracker().state(), Default::default());
}

#[tokio::test]
async fn test_closed_pipeline_returns_503() {
    let (pipeline, _sink) = pipeline();
    pipeline.close();

    let response = send(&pipeline, post("/thermal-data", "{}")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (pipeline, _sink) = pipeline();
    let response = send(&pipeline, post("/nope", "{}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_state() {
    let (pipeline, _sink) = pipeline();
    send(&pipeline, post("/thermal-data", r#"{"cpu_freq": 2000}"#)).await;

    let response = send(
        &pipeline,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.monitoring.running);
    assert!(health.monitoring.hysteresis.throttling);
    assert_eq!(health.monitoring.rate_limits.len(), 1);
}

#[tokio::test]
async fn test_reset_clears_rate_limits() {
    let (pipeline, sink) = pipeline();
    let hot = r#"{"cpu_temp": 95, "cpu_freq": 3400}"#;

    send(&pipeline, post("/thermal-data", hot)).await;
    send(&pipeline, post("/thermal-data", hot)).await;
    assert_eq!(sink.notifications.lock().len(), 1);

    let response = send(&pipeline, post("/rate-limits/reset", "")).await;
    assert_eq!(response.status(), StatusCode::OK);

    send(&pipeline, post("/thermal-data", hot)).await;
    assert_eq!(sink.notifications.lock().len(), 2);
}
