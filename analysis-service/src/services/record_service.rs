use std::sync::Arc;

use service_core::error::AppError;
use tracing::{info, instrument};

use crate::models::{Receivable, RecordKind, Summary, SummaryFilter};
use crate::services::metrics;
use crate::services::reader::ReceivableReader;

/// Read and summary operations for one receivable kind.
pub struct RecordService {
    kind: RecordKind,
    reader: Arc<dyn ReceivableReader>,
}

impl RecordService {
    pub fn new(kind: RecordKind, reader: Arc<dyn ReceivableReader>) -> Self {
        Self { kind, reader }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// All records of this kind, or `None` when there are none.
    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn get_all(&self) -> Result<Option<Vec<Receivable>>, AppError> {
        let records = self.reader.get_all(self.kind).await?;
        Ok((!records.is_empty()).then_some(records))
    }

    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn get_by_reference(&self, reference: &str) -> Result<Option<Receivable>, AppError> {
        let record = self.reader.get_by_reference(self.kind, reference).await?;
        metrics::record_lookup(self.kind.as_str(), record.is_some());
        Ok(record)
    }

    /// Build the summary for `filter`. The caller has already checked the date range.
    #[instrument(skip(self), fields(kind = self.kind.as_str()))]
    pub async fn summary(&self, filter: SummaryFilter) -> Result<Summary, AppError> {
        let records = self.reader.find_matching(self.kind, &filter).await?;
        let summary = Summary::new(self.kind, &filter, records);

        metrics::record_summary(self.kind.as_str(), filter.status().as_str());
        info!(
            records = summary.len(),
            total_amount = %summary.total_amount,
            status = filter.status().as_str(),
            "Summary computed"
        );

        Ok(summary)
    }
}
