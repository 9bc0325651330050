pub mod database;
pub mod metrics;
pub mod reader;
pub mod record_service;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use reader::{InMemoryRepository, ReceivableReader};
pub use record_service::RecordService;
