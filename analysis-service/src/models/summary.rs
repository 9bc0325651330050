//! Filtered aggregation over receivables.
//!
//! The filter narrows by issue-date range, then optionally by open/closed
//! status. Status filtering only applies when exactly one of the two flags
//! is `true` and the other is explicitly `false`; every other combination,
//! including absent flags, keeps both open and closed records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use service_core::error::AppError;

use super::{Receivable, RecordKind};

/// Open/closed narrowing derived from the two optional flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    OpenOnly,
    ClosedOnly,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::OpenOnly => "open",
            StatusFilter::ClosedOnly => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_open: Option<bool>,
    pub include_closed: Option<bool>,
}

impl SummaryFilter {
    /// Reject a range whose start lies after its end.
    pub fn check_range(&self) -> Result<(), AppError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AppError::bad_request(
                "Start date cannot be greater than end date.",
            )),
            _ => Ok(()),
        }
    }

    pub fn status(&self) -> StatusFilter {
        match (self.include_open, self.include_closed) {
            (Some(true), Some(false)) => StatusFilter::OpenOnly,
            (Some(false), Some(true)) => StatusFilter::ClosedOnly,
            _ => StatusFilter::All,
        }
    }

    pub fn matches(&self, record: &Receivable) -> bool {
        if self.start_date.is_some_and(|start| record.issue_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| record.issue_date > end) {
            return false;
        }

        match self.status() {
            StatusFilter::All => true,
            StatusFilter::OpenOnly => record.is_open(),
            StatusFilter::ClosedOnly => !record.is_open(),
        }
    }

    /// Keep the records the filter admits, preserving their order.
    pub fn apply<I>(&self, records: I) -> Vec<Receivable>
    where
        I: IntoIterator<Item = Receivable>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// The filtered records, keyed by kind in the serialised summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordList {
    #[serde(rename = "invoices")]
    Invoices(Vec<Receivable>),
    #[serde(rename = "creditNotes")]
    CreditNotes(Vec<Receivable>),
}

impl RecordList {
    pub fn new(kind: RecordKind, records: Vec<Receivable>) -> Self {
        match kind {
            RecordKind::Invoice => RecordList::Invoices(records),
            RecordKind::CreditNote => RecordList::CreditNotes(records),
        }
    }

    pub fn records(&self) -> &[Receivable] {
        match self {
            RecordList::Invoices(records) | RecordList::CreditNotes(records) => records,
        }
    }
}

/// Filter echo, total opening value, and the matching records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_open: Option<bool>,
    pub include_closed: Option<bool>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(flatten)]
    pub records: RecordList,
}

impl Summary {
    /// Build a summary from records that already satisfy `filter`.
    pub fn new(kind: RecordKind, filter: &SummaryFilter, records: Vec<Receivable>) -> Self {
        let total_amount = records.iter().map(|r| r.opening_value).sum();

        Self {
            start_date: filter.start_date,
            end_date: filter.end_date,
            include_open: filter.include_open,
            include_closed: filter.include_closed,
            total_amount,
            records: RecordList::new(kind, records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.records().is_empty()
    }
}
