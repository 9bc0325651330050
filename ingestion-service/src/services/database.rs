//! PostgreSQL storage for ingestion-service.

use std::time::Duration;

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::models::{Receivable, RecordKind};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::repository::ReceivableRepository;

const COLUMNS: &str = "reference, currency_code, issue_date, opening_value, paid_value, \
    due_date, closed_date, cancelled, debtor_name, debtor_reference, debtor_country_code, \
    debtor_address1, debtor_address2, debtor_town, debtor_state, debtor_zip, \
    debtor_registration_number";

const COLUMN_COUNT: usize = 17;

/// PostgreSQL caps a statement at 65535 bind parameters.
const ROWS_PER_STATEMENT: usize = u16::MAX as usize / COLUMN_COUNT;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "ingestion-service"))]
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

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl ReceivableRepository for Database {
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

    #[instrument(skip(self, kind, records), fields(kind = kind.as_str(), count = records.len()))]
    async fn insert_bulk(&self, kind: RecordKind, records: &[Receivable]) -> Result<u64, AppError> {
        if records.is_empty() {
            return Ok(0);
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_bulk"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let mut inserted = 0;
        for chunk in records.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} ({}) ", kind.table(), COLUMNS));

            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.reference.clone())
                    .push_bind(record.currency_code.clone())
                    .push_bind(record.issue_date)
                    .push_bind(record.opening_value)
                    .push_bind(record.paid_value)
                    .push_bind(record.due_date)
                    .push_bind(record.closed_date)
                    .push_bind(record.cancelled)
                    .push_bind(record.debtor_name.clone())
                    .push_bind(record.debtor_reference.clone())
                    .push_bind(record.debtor_country_code.clone())
                    .push_bind(record.debtor_address1.clone())
                    .push_bind(record.debtor_address2.clone())
                    .push_bind(record.debtor_town.clone())
                    .push_bind(record.debtor_state.clone())
                    .push_bind(record.debtor_zip.clone())
                    .push_bind(record.debtor_registration_number.clone());
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                        AppError::Conflict(anyhow::anyhow!(
                            "One or more {} references already exist",
                            kind.label()
                        ))
                    }
                    _ => AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to insert {}: {}",
                        kind.table(),
                        e
                    )),
                })?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit insert: {}", e))
        })?;

        timer.observe_duration();
        info!(inserted = inserted, "Records inserted");

        Ok(inserted)
    }

    #[instrument(skip(self, kind, record), fields(kind = kind.as_str(), reference = %record.reference))]
    async fn update(&self, kind: RecordKind, record: &Receivable) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update"])
            .start_timer();

        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET currency_code = $2, issue_date = $3, opening_value = $4, paid_value = $5,
                due_date = $6, closed_date = $7, cancelled = $8, debtor_name = $9,
                debtor_reference = $10, debtor_country_code = $11, debtor_address1 = $12,
                debtor_address2 = $13, debtor_town = $14, debtor_state = $15,
                debtor_zip = $16, debtor_registration_number = $17
            WHERE reference = $1
            "#,
            kind.table()
        ))
        .bind(&record.reference)
        .bind(&record.currency_code)
        .bind(record.issue_date)
        .bind(record.opening_value)
        .bind(record.paid_value)
        .bind(record.due_date)
        .bind(record.closed_date)
        .bind(record.cancelled)
        .bind(&record.debtor_name)
        .bind(&record.debtor_reference)
        .bind(&record.debtor_country_code)
        .bind(&record.debtor_address1)
        .bind(&record.debtor_address2)
        .bind(&record.debtor_town)
        .bind(&record.debtor_state)
        .bind(&record.debtor_zip)
        .bind(&record.debtor_registration_number)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update {}: {}", kind.label(), e))
        })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, kind), fields(kind = kind.as_str()))]
    async fn delete(&self, kind: RecordKind, reference: &str) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete"])
            .start_timer();

        let result = sqlx::query(&format!("DELETE FROM {} WHERE reference = $1", kind.table()))
            .bind(reference)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete {}: {}", kind.label(), e))
            })?;

        timer.observe_duration();

        Ok(result.rows_affected())
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
