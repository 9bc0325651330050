//! Read-only storage seam for receivables.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{Receivable, RecordKind, SummaryFilter};

/// Read access to one receivable table per [`RecordKind`].
#[async_trait]
pub trait ReceivableReader: Send + Sync {
    /// Every record of the kind, ordered by issue date then reference.
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Receivable>, AppError>;

    async fn get_by_reference(
        &self,
        kind: RecordKind,
        reference: &str,
    ) -> Result<Option<Receivable>, AppError>;

    /// Records admitted by `filter`, in the same order as [`get_all`](Self::get_all).
    async fn find_matching(
        &self,
        kind: RecordKind,
        filter: &SummaryFilter,
    ) -> Result<Vec<Receivable>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Reader over records held in memory. Used by tests and for local runs.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<HashMap<RecordKind, Vec<Receivable>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records of one kind. Later records replace earlier ones with the same reference.
    pub fn with_records(self, kind: RecordKind, records: Vec<Receivable>) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            let table = tables.entry(kind).or_default();
            for record in records {
                table.retain(|r| r.reference != record.reference);
                table.push(record);
            }
            table.sort_by(|a, b| {
                a.issue_date
                    .cmp(&b.issue_date)
                    .then_with(|| a.reference.cmp(&b.reference))
            });
        }
        self
    }

    fn read<T>(
        &self,
        kind: RecordKind,
        f: impl FnOnce(&[Receivable]) -> T,
    ) -> Result<T, AppError> {
        let tables = self.tables.read().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Repository lock poisoned: {}", e))
        })?;
        Ok(f(tables.get(&kind).map(Vec::as_slice).unwrap_or_default()))
    }
}

#[async_trait]
impl ReceivableReader for InMemoryRepository {
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Receivable>, AppError> {
        self.read(kind, <[Receivable]>::to_vec)
    }

    async fn get_by_reference(
        &self,
        kind: RecordKind,
        reference: &str,
    ) -> Result<Option<Receivable>, AppError> {
        self.read(kind, |records| {
            records.iter().find(|r| r.reference == reference).cloned()
        })
    }

    async fn find_matching(
        &self,
        kind: RecordKind,
        filter: &SummaryFilter,
    ) -> Result<Vec<Receivable>, AppError> {
        self.read(kind, |records| filter.apply(records.iter().cloned()))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
