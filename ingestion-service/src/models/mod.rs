//! Domain models for ingestion-service.

mod dto;
mod receivable;

pub use dto::{ReceivableDto, DATE_FORMAT};
pub use receivable::{Receivable, RecordKind, RuleViolations};
