pub mod receivable;
pub mod summary;

pub use receivable::{Receivable, RecordKind};
pub use summary::{RecordList, StatusFilter, Summary, SummaryFilter};
