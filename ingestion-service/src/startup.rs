//! Application startup and lifecycle management.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, RequestIdMakeSpan};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::IngestionConfig;
use crate::handlers::{self, HealthState};
use crate::models::RecordKind;
use crate::services::{init_metrics, Database, ReceivableRepository, RecordService};

/// Build the HTTP router over any repository implementation.
pub fn build_router(repository: Arc<dyn ReceivableRepository>) -> Router {
    let invoices = Arc::new(RecordService::new(RecordKind::Invoice, repository.clone()));
    let credit_notes = Arc::new(RecordService::new(RecordKind::CreditNote, repository.clone()));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(HealthState { repository })
        .nest(RecordKind::Invoice.path(), handlers::records::router(invoices))
        .nest(
            RecordKind::CreditNote.path(),
            handlers::records::router(credit_notes),
        )
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    db: Database,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: IngestionConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: IngestionConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: IngestionConfig, run_migrations: bool) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let router = build_router(Arc::new(db.clone()));

        // Port 0 binds a random port, which tests rely on.
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Ingestion service listener bound");

        Ok(Self {
            port,
            listener,
            db,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "ingestion-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, self.router).await
    }
}
