//! Common test utilities for ingestion-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ingestion_service::config::{DatabaseConfig, IngestionConfig};
use ingestion_service::services::InMemoryRepository;
use ingestion_service::startup::{build_router, Application};
use serde_json::{json, Value};
use service_core::config::Config as CommonConfig;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,ingestion_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Router backed by a fresh in-memory repository.
pub fn in_memory_app() -> Router {
    init_tracing();
    build_router(Arc::new(InMemoryRepository::new()))
}

/// Wire-format record with the given dates; everything else is fixed sample data.
pub fn record(reference: &str, issue: &str, due: &str, closed: Option<&str>) -> Value {
    json!({
        "reference": reference,
        "currencyCode": "EUR",
        "issueDate": issue,
        "openingValue": 1001.0,
        "paidValue": 1000.0,
        "dueDate": due,
        "closedDate": closed,
        "cancelled": false,
        "debtorName": "Random Bank",
        "debtorReference": "3d811c09-c951-446e-a976-3cc176aaa28c",
        "debtorCountryCode": "RO",
        "debtorAddress1": "Bucharest",
        "debtorAddress2": "Random Street",
        "debtorTown": "Bucharest",
        "debtorState": "Romania",
        "debtorZip": "123456",
        "debtorRegistrationNumber": "1234567890"
    })
}

/// Valid: closed on its due date.
pub fn r1() -> Value {
    record("R1", "2023-11-01", "2023-11-30", Some("2023-11-30"))
}

/// Invalid: due before issue.
pub fn r2() -> Value {
    record("R2", "2023-12-31", "2023-11-30", None)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub fn references(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["reference"].as_str().unwrap().to_string())
        .collect()
}

/// Test configuration pointing at `TEST_DATABASE_URL`.
pub fn test_config() -> IngestionConfig {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run PostgreSQL integration tests");

    IngestionConfig {
        common: CommonConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        service_name: "ingestion-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: database_url,
            max_connections: 2,
            min_connections: 1,
        },
    }
}

/// Spawn the real application against PostgreSQL and return its base address.
pub async fn spawn_app() -> String {
    init_tracing();

    let app = Application::build(test_config())
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    address
}

/// Reference that will not collide with rows left by earlier runs.
pub fn unique_reference(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{:x}", prefix, nanos)
}
