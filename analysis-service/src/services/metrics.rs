//! Prometheus metrics for analysis-service.

use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

/// Database query duration by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "analysis_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Summaries built, by kind and the open/closed narrowing applied.
pub static SUMMARIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "analysis_summaries_total",
        "Total number of summaries computed",
        &["kind", "status"]
    )
    .expect("Failed to register SUMMARIES_TOTAL")
});

/// Lookups by reference, by kind and whether the record was found.
pub static LOOKUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "analysis_lookups_total",
        "Total number of lookups by reference",
        &["kind", "status"]
    )
    .expect("Failed to register LOOKUPS_TOTAL")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&SUMMARIES_TOTAL);
    Lazy::force(&LOOKUPS_TOTAL);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    service_core::middleware::metrics::gather_metrics()
}

pub fn record_summary(kind: &str, status: &str) {
    SUMMARIES_TOTAL.with_label_values(&[kind, status]).inc();
}

pub fn record_lookup(kind: &str, found: bool) {
    LOOKUPS_TOTAL
        .with_label_values(&[kind, if found { "found" } else { "not_found" }])
        .inc();
}
