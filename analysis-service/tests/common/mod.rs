//! Shared helpers for analysis-service integration tests.

#![allow(dead_code)]

use analysis_service::config::{AnalysisConfig, DatabaseConfig};
use analysis_service::models::{Receivable, RecordKind};
use analysis_service::services::InMemoryRepository;
use analysis_service::startup::{build_router, Application};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use service_core::config::Config as CommonConfig;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,analysis_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn receivable(reference: &str, issue: &str, closed: Option<&str>, opening: i64) -> Receivable {
    Receivable {
        reference: reference.to_string(),
        currency_code: "EUR".to_string(),
        issue_date: date(issue),
        opening_value: Decimal::from(opening),
        paid_value: Decimal::ZERO,
        due_date: date(issue),
        closed_date: closed.map(date),
        cancelled: Some(false),
        debtor_name: "Random Bank".to_string(),
        debtor_reference: "3d811c09-c951-446e-a976-3cc176aaa28c".to_string(),
        debtor_country_code: "RO".to_string(),
        debtor_address1: None,
        debtor_address2: None,
        debtor_town: Some("Bucharest".to_string()),
        debtor_state: None,
        debtor_zip: None,
        debtor_registration_number: None,
    }
}

/// One open and one closed record in November 2023, both worth 500.
pub fn november_pair() -> Vec<Receivable> {
    vec![
        receivable("OPEN-1", "2023-11-05", None, 500),
        receivable("CLOSED-1", "2023-11-10", Some("2023-11-20"), 500),
    ]
}

/// Router with the November pair stored under both kinds, plus one December invoice.
pub fn seeded_app() -> Router {
    init_tracing();

    let mut invoices = november_pair();
    invoices.push(receivable("DEC-1", "2023-12-01", None, 42));

    let repo = InMemoryRepository::new()
        .with_records(RecordKind::Invoice, invoices)
        .with_records(RecordKind::CreditNote, november_pair());

    build_router(Arc::new(repo))
}

pub fn empty_app() -> Router {
    init_tracing();
    build_router(Arc::new(InMemoryRepository::new()))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn references(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["reference"].as_str().unwrap().to_string())
        .collect()
}

pub fn test_config() -> AnalysisConfig {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run PostgreSQL integration tests");

    AnalysisConfig {
        common: CommonConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        service_name: "analysis-service-test".to_string(),
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

/// Spawn the application on a random port and return the pool alongside its address.
pub async fn spawn_app() -> (String, sqlx::PgPool) {
    init_tracing();

    let app = Application::build(test_config())
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());
    let pool = app.db().pool().clone();

    sqlx::migrate!("../ingestion-service/migrations")
        .run(&pool)
        .await
        .expect("Failed to apply schema migrations");

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    (address, pool)
}
