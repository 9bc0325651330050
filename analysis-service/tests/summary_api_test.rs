//! Router tests for the read and summary endpoints.

mod common;

use axum::http::StatusCode;
use common::{empty_app, get, references, seeded_app};
use serde_json::Value;

#[tokio::test]
async fn list_returns_every_invoice() {
    let app = seeded_app();

    let (status, body) = get(&app, "/invoice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body), vec!["OPEN-1", "CLOSED-1", "DEC-1"]);
    assert_eq!(body[0]["issueDate"], "2023-11-05");
}

#[tokio::test]
async fn list_on_empty_store_is_not_found() {
    let app = empty_app();

    let (status, _) = get(&app, "/creditnote").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_by_reference_finds_and_misses() {
    let app = seeded_app();

    let (status, body) = get(&app, "/creditnote/CLOSED-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closedDate"], "2023-11-20");

    let (status, _) = get(&app, "/creditnote/DEC-1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_reference_is_a_bad_request() {
    let app = seeded_app();

    let (status, body) = get(&app, "/invoice/%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Reference can not be null or empty!");
}

#[tokio::test]
async fn open_only_summary_returns_the_open_invoice() {
    let app = seeded_app();

    let (status, body) = get(
        &app,
        "/invoice/summary?startDate=2023-11-01&endDate=2023-11-30&includeOpen=true&includeClosed=false",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body["invoices"]), vec!["OPEN-1"]);
    assert_eq!(body["totalAmount"].as_f64(), Some(500.0));
    assert_eq!(body["startDate"], "2023-11-01");
    assert_eq!(body["includeOpen"], true);
    assert_eq!(body["includeClosed"], false);
}

#[tokio::test]
async fn both_flags_or_none_include_everything_in_range() {
    let app = seeded_app();

    for query in [
        "startDate=2023-11-01&endDate=2023-11-30&includeOpen=true&includeClosed=true",
        "startDate=2023-11-01&endDate=2023-11-30",
    ] {
        let (status, body) = get(&app, &format!("/invoice/summary?{}", query)).await;

        assert_eq!(status, StatusCode::OK, "{}", query);
        assert_eq!(references(&body["invoices"]), vec!["OPEN-1", "CLOSED-1"]);
        assert_eq!(body["totalAmount"].as_f64(), Some(1000.0));
    }
}

#[tokio::test]
async fn closed_only_summary_for_credit_notes() {
    let app = seeded_app();

    let (status, body) = get(
        &app,
        "/creditnote/summary?includeOpen=false&includeClosed=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body["creditNotes"]), vec!["CLOSED-1"]);
    assert!(body.get("invoices").is_none());
    assert_eq!(body["startDate"], Value::Null);
}

#[tokio::test]
async fn kind_specific_flag_names_are_accepted() {
    let app = seeded_app();

    let (status, body) = get(
        &app,
        "/invoice/summary?includeOpenInvoices=true&includeClosedInvoices=false",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body["invoices"]), vec!["OPEN-1", "DEC-1"]);
    assert_eq!(body["totalAmount"].as_f64(), Some(542.0));

    let (status, body) = get(
        &app,
        "/creditnote/summary?includeOpenCreditNotes=false&includeClosedCreditNotes=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body["creditNotes"]), vec!["CLOSED-1"]);
}

#[tokio::test]
async fn flags_are_matched_case_insensitively() {
    let app = seeded_app();

    let (status, body) = get(
        &app,
        "/invoice/summary?startDate=2023-11-01&endDate=2023-11-30&includeOpen=True&includeClosed=False",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(references(&body["invoices"]), vec!["OPEN-1"]);
    assert_eq!(body["includeOpen"], true);
    assert_eq!(body["includeClosed"], false);

    let (status, body) = get(&app, "/creditnote/summary?includeClosedCreditNotes=TRUE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["includeClosed"], true);
}

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let app = seeded_app();

    let (status, body) = get(
        &app,
        "/invoice/summary?startDate=2023-11-02&endDate=2023-11-01",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Start date cannot be greater than end date.");
}

#[tokio::test]
async fn malformed_query_is_a_bad_request() {
    let app = seeded_app();

    let (status, _) = get(&app, "/invoice/summary?startDate=01-11-2023").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/invoice/summary?includeOpen=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_over_empty_store_is_zero() {
    let app = empty_app();

    let (status, body) = get(&app, "/creditnote/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["creditNotes"], serde_json::json!([]));
    assert_eq!(body["totalAmount"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn health_endpoint_reports_service() {
    let app = empty_app();

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "analysis-service");
}
