//! Services module for ingestion-service.

pub mod database;
pub mod metrics;
pub mod record_service;
pub mod repository;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use record_service::{InsertOutcome, RecordService};
pub use repository::{InMemoryRepository, ReceivableRepository};
