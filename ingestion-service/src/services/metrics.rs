//! Prometheus metrics for ingestion-service.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

/// Database query duration by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "ingestion_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Records seen by the insert path, split by kind and outcome (accepted/rejected).
pub static RECORDS_INGESTED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ingestion_records_total",
        "Total number of records submitted for ingestion",
        &["kind", "outcome"]
    )
    .expect("Failed to register RECORDS_INGESTED")
});

/// Counter for record mutations other than insert.
pub static RECORD_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ingestion_record_operations_total",
        "Total number of update and delete operations",
        &["kind", "operation", "status"]
    )
    .expect("Failed to register RECORD_OPERATIONS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&RECORDS_INGESTED);
    Lazy::force(&RECORD_OPERATIONS);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    service_core::middleware::metrics::gather_metrics()
}

pub fn record_ingested(kind: &str, accepted: usize, rejected: usize) {
    RECORDS_INGESTED
        .with_label_values(&[kind, "accepted"])
        .inc_by(accepted as f64);
    RECORDS_INGESTED
        .with_label_values(&[kind, "rejected"])
        .inc_by(rejected as f64);
}

pub fn record_operation(kind: &str, operation: &str, status: &str) {
    RECORD_OPERATIONS
        .with_label_values(&[kind, operation, status])
        .inc();
}
