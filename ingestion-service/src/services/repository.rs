//! Storage seam for receivables.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{Receivable, RecordKind};

/// CRUD access to one receivable table per [`RecordKind`], keyed by reference.
#[async_trait]
pub trait ReceivableRepository: Send + Sync {
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Receivable>, AppError>;

    async fn get_by_reference(
        &self,
        kind: RecordKind,
        reference: &str,
    ) -> Result<Option<Receivable>, AppError>;

    /// Insert every record as one storage operation; either all rows land or none do.
    async fn insert_bulk(&self, kind: RecordKind, records: &[Receivable]) -> Result<u64, AppError>;

    /// Overwrite all columns of the row with the record's reference. Returns false if no row matched.
    async fn update(&self, kind: RecordKind, record: &Receivable) -> Result<bool, AppError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, kind: RecordKind, reference: &str) -> Result<u64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Process-local repository used by tests and local runs without PostgreSQL.
pub struct InMemoryRepository {
    tables: Mutex<HashMap<RecordKind, BTreeMap<String, Receivable>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    fn with_table<T>(
        &self,
        kind: RecordKind,
        f: impl FnOnce(&mut BTreeMap<String, Receivable>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Repository mutex poisoned: {}", e)))?;
        f(tables.entry(kind).or_default())
    }
}

#[async_trait]
impl ReceivableRepository for InMemoryRepository {
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Receivable>, AppError> {
        self.with_table(kind, |table| Ok(table.values().cloned().collect()))
    }

    async fn get_by_reference(
        &self,
        kind: RecordKind,
        reference: &str,
    ) -> Result<Option<Receivable>, AppError> {
        self.with_table(kind, |table| Ok(table.get(reference).cloned()))
    }

    async fn insert_bulk(&self, kind: RecordKind, records: &[Receivable]) -> Result<u64, AppError> {
        self.with_table(kind, |table| {
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = records
                .iter()
                .find(|r| table.contains_key(&r.reference) || !seen.insert(r.reference.as_str()))
            {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "{} '{}' already exists",
                    kind.label(),
                    dup.reference
                )));
            }

            for record in records {
                table.insert(record.reference.clone(), record.clone());
            }
            Ok(records.len() as u64)
        })
    }

    async fn update(&self, kind: RecordKind, record: &Receivable) -> Result<bool, AppError> {
        self.with_table(kind, |table| match table.get_mut(&record.reference) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        })
    }

    async fn delete(&self, kind: RecordKind, reference: &str) -> Result<u64, AppError> {
        self.with_table(kind, |table| Ok(u64::from(table.remove(reference).is_some())))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
