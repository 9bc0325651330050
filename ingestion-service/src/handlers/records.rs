//! Receivable endpoints. The same routes serve `/invoice` and `/creditnote`;
//! the nested router's state decides which table is touched.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use service_core::error::AppError;
use validator::Validate;

use crate::models::ReceivableDto;
use crate::services::RecordService;

pub fn router(service: Arc<RecordService>) -> Router {
    Router::new()
        .route(
            "/",
            get(list_records).post(insert_records).put(update_record),
        )
        .route("/:reference", get(get_record).delete(delete_record))
        .with_state(service)
}

/// Blank references are rejected; anything else is looked up exactly as given.
fn require_reference(reference: &str) -> Result<&str, AppError> {
    if reference.trim().is_empty() {
        return Err(AppError::bad_request("Reference can not be null or empty!"));
    }
    Ok(reference)
}

/// GET /{kind}
async fn list_records(
    State(service): State<Arc<RecordService>>,
) -> Result<Json<Vec<ReceivableDto>>, AppError> {
    let records = service.get_all().await?.ok_or_else(|| {
        AppError::not_found(format!("No {} records found", service.kind().label()))
    })?;

    Ok(Json(records))
}

/// GET /{kind}/:reference
async fn get_record(
    State(service): State<Arc<RecordService>>,
    Path(reference): Path<String>,
) -> Result<Json<ReceivableDto>, AppError> {
    let reference = require_reference(&reference)?;

    let record = service.get_by_reference(reference).await?.ok_or_else(|| {
        AppError::not_found(format!("{} '{}' not found", service.kind().label(), reference))
    })?;

    Ok(Json(record))
}

/// POST /{kind}
///
/// Shape errors reject the whole request. Business-rule violations only drop
/// the offending records; the response lists what was stored.
async fn insert_records(
    State(service): State<Arc<RecordService>>,
    Json(payload): Json<Option<Vec<ReceivableDto>>>,
) -> Result<Json<Vec<ReceivableDto>>, AppError> {
    let label = service.kind().label();
    let dtos = payload
        .ok_or_else(|| AppError::bad_request(format!("{} payload cannot be null!", label)))?;

    for dto in &dtos {
        dto.validate()?;
    }

    let inserted = service.insert(dtos).await?.into_accepted_dtos();
    if inserted.is_empty() {
        return Err(AppError::bad_request(format!("{} payload is invalid!", label)));
    }

    Ok(Json(inserted))
}

/// PUT /{kind}
async fn update_record(
    State(service): State<Arc<RecordService>>,
    Json(dto): Json<ReceivableDto>,
) -> Result<Json<ReceivableDto>, AppError> {
    dto.validate()?;
    require_reference(&dto.reference)?;

    let reference = dto.reference.clone();
    let updated = service.update(dto).await?.ok_or_else(|| {
        AppError::not_found(format!("{} '{}' not found", service.kind().label(), reference))
    })?;

    Ok(Json(updated))
}

/// DELETE /{kind}/:reference
async fn delete_record(
    State(service): State<Arc<RecordService>>,
    Path(reference): Path<String>,
) -> Result<Json<bool>, AppError> {
    let reference = require_reference(&reference)?;

    if service.delete(reference).await? {
        Ok(Json(true))
    } else {
        Err(AppError::not_found(format!(
            "{} '{}' not found",
            service.kind().label(),
            reference
        )))
    }
}
