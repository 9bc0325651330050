//! PostgreSQL read access for analysis-service. The schema is owned by ingestion-service.

use std::time::Duration;

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::models::{Receivable, RecordKind, StatusFilter, SummaryFilter};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::reader::ReceivableReader;

const COLUMNS: &str = "reference, currency_code, issue_date, opening_value, paid_value, \
    due_date, closed_date, cancelled, debtor_name, debtor_reference, debtor_country_code, \
    debtor_address1, debtor_address2, debtor_town, debtor_state, debtor_zip, \
    debtor_registration_number";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "analysis-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReceivableReader for Database {
    #[instrument(skip(self, kind), fields(kind = kind.as_str()))]
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Receivable>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_all"])
            .start_timer();

        let records = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {} FROM {} ORDER BY issue_date, reference",
            COLUMNS,
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list {}: {}", kind.table(), e))
        })?;

        timer.observe_duration();

        Ok(records)
    }

    #[instrument(skip(self, kind), fields(kind = kind.as_str()))]
    async fn get_by_reference(
        &self,
        kind: RecordKind,
        reference: &str,
    ) -> Result<Option<Receivable>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_by_reference"])
            .start_timer();

        let record = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {} FROM {} WHERE reference = $1",
            COLUMNS,
            kind.table()
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get {}: {}", kind.label(), e))
        })?;

        timer.observe_duration();

        Ok(record)
    }

    /// Absent bounds bind as NULL and disable their predicate.
    #[instrument(skip(self, kind), fields(kind = kind.as_str()))]
    async fn find_matching(
        &self,
        kind: RecordKind,
        filter: &SummaryFilter,
    ) -> Result<Vec<Receivable>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_matching"])
            .start_timer();

        let status = filter.status();

        let records = sqlx::query_as::<_, Receivable>(&format!(
            r#"
            SELECT {} FROM {}
            WHERE ($1::date IS NULL OR issue_date >= $1)
              AND ($2::date IS NULL OR issue_date <= $2)
              AND (NOT $3 OR closed_date IS NULL)
              AND (NOT $4 OR closed_date IS NOT NULL)
            ORDER BY issue_date, reference
            "#,
            COLUMNS,
            kind.table()
        ))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(status == StatusFilter::OpenOnly)
        .bind(status == StatusFilter::ClosedOnly)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Failed to query {} summary: {}",
                kind.label(),
                e
            ))
        })?;

        timer.observe_duration();

        Ok(records)
    }

    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }
}
