//! Read-only receivable endpoints, mounted once per kind.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use service_core::error::AppError;

use crate::models::{Receivable, Summary, SummaryFilter};
use crate::services::RecordService;

pub fn router(service: Arc<RecordService>) -> Router {
    Router::new()
        .route("/", get(list_records))
        .route("/summary", get(summary))
        .route("/:reference", get(get_record))
        .with_state(service)
}

/// Query string for `/summary`. The kind-specific flag names are accepted too.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        alias = "includeOpenInvoices",
        alias = "includeOpenCreditNotes"
    )]
    pub include_open: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        alias = "includeClosedInvoices",
        alias = "includeClosedCreditNotes"
    )]
    pub include_closed: Option<bool>,
}

/// Boolean flags are matched case-insensitively (`true`, `True`, `TRUE`).
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(de::Error::custom(format!(
                "invalid boolean `{}`, expected `true` or `false`",
                value
            ))),
        })
        .transpose()
}

impl From<SummaryQuery> for SummaryFilter {
    fn from(query: SummaryQuery) -> Self {
        Self {
            start_date: query.start_date,
            end_date: query.end_date,
            include_open: query.include_open,
            include_closed: query.include_closed,
        }
    }
}

/// GET /{kind}
async fn list_records(
    State(service): State<Arc<RecordService>>,
) -> Result<Json<Vec<Receivable>>, AppError> {
    let records = service.get_all().await?.ok_or_else(|| {
        AppError::not_found(format!("No {} records found", service.kind().label()))
    })?;

    Ok(Json(records))
}

/// GET /{kind}/:reference
async fn get_record(
    State(service): State<Arc<RecordService>>,
    Path(reference): Path<String>,
) -> Result<Json<Receivable>, AppError> {
    if reference.trim().is_empty() {
        return Err(AppError::bad_request("Reference can not be null or empty!"));
    }

    let record = service.get_by_reference(&reference).await?.ok_or_else(|| {
        AppError::not_found(format!("{} '{}' not found", service.kind().label(), reference))
    })?;

    Ok(Json(record))
}

/// GET /{kind}/summary?startDate&endDate&includeOpen&includeClosed
async fn summary(
    State(service): State<Arc<RecordService>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Summary>, AppError> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;

    let filter = SummaryFilter::from(query);
    filter.check_range()?;

    Ok(Json(service.summary(filter).await?))
}
