//! Orchestrates conversion, validation and storage for one receivable kind.

use std::sync::Arc;

use service_core::error::AppError;
use tracing::{info, instrument, warn};

use crate::models::{Receivable, ReceivableDto, RecordKind, RuleViolations};
use crate::services::metrics;
use crate::services::repository::ReceivableRepository;

/// Result of a batch insert: what was persisted and what was turned away.
#[derive(Debug, Default)]
pub struct InsertOutcome {
    pub accepted: Vec<Receivable>,
    pub rejected: Vec<RuleViolations>,
}

impl InsertOutcome {
    pub fn into_accepted_dtos(self) -> Vec<ReceivableDto> {
        self.accepted.into_iter().map(ReceivableDto::from).collect()
    }
}

pub struct RecordService {
    kind: RecordKind,
    repository: Arc<dyn ReceivableRepository>,
}

impl RecordService {
    pub fn new(kind: RecordKind, repository: Arc<dyn ReceivableRepository>) -> Self {
        Self { kind, repository }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// All records of this kind, or `None` when the table is empty.
    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn get_all(&self) -> Result<Option<Vec<ReceivableDto>>, AppError> {
        let records = self.repository.get_all(self.kind).await?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records.into_iter().map(ReceivableDto::from).collect()))
    }

    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn get_by_reference(&self, reference: &str) -> Result<Option<ReceivableDto>, AppError> {
        let record = self.repository.get_by_reference(self.kind, reference).await?;
        Ok(record.map(ReceivableDto::from))
    }

    /// Convert and validate every record, then bulk-insert the valid ones.
    ///
    /// Rule violations never fail the batch: they are logged and returned in
    /// `rejected`. Only a storage failure aborts the call.
    #[instrument(skip(self, dtos), fields(kind = self.kind.as_str(), submitted = dtos.len()))]
    pub async fn insert(&self, dtos: Vec<ReceivableDto>) -> Result<InsertOutcome, AppError> {
        let records = dtos
            .into_iter()
            .map(Receivable::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = InsertOutcome::default();
        for record in records {
            match record.validate(self.kind) {
                Ok(()) => outcome.accepted.push(record),
                Err(violations) => outcome.rejected.push(violations),
            }
        }

        if !outcome.accepted.is_empty() {
            self.repository
                .insert_bulk(self.kind, &outcome.accepted)
                .await?;
        }

        for violations in &outcome.rejected {
            warn!(reference = %violations.reference, "{}", violations);
        }

        metrics::record_ingested(
            self.kind.as_str(),
            outcome.accepted.len(),
            outcome.rejected.len(),
        );
        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Batch ingested"
        );

        Ok(outcome)
    }

    /// Replace every field of an existing record. `None` when the reference is unknown.
    #[instrument(skip(self, dto), fields(kind = self.kind.as_str(), reference = %dto.reference))]
    pub async fn update(&self, dto: ReceivableDto) -> Result<Option<ReceivableDto>, AppError> {
        let record = Receivable::try_from(dto)?;

        if let Err(violations) = record.validate(self.kind) {
            warn!(reference = %violations.reference, "{}", violations);
            metrics::record_operation(self.kind.as_str(), "update", "rejected");
            return Err(AppError::bad_request(violations.to_string()));
        }

        let updated = self.repository.update(self.kind, &record).await?;
        metrics::record_operation(
            self.kind.as_str(),
            "update",
            if updated { "ok" } else { "not_found" },
        );

        Ok(updated.then(|| ReceivableDto::from(record)))
    }

    /// Returns whether a row was actually removed.
    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn delete(&self, reference: &str) -> Result<bool, AppError> {
        let removed = self.repository.delete(self.kind, reference).await? > 0;
        metrics::record_operation(
            self.kind.as_str(),
            "delete",
            if removed { "ok" } else { "not_found" },
        );
        Ok(removed)
    }
}
