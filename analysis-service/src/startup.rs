//! Application startup and lifecycle management.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, RequestIdMakeSpan};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AnalysisConfig;
use crate::handlers::{self, HealthState};
use crate::models::RecordKind;
use crate::services::{init_metrics, Database, ReceivableReader, RecordService};

/// Build the HTTP router over any reader implementation.
pub fn build_router(reader: Arc<dyn ReceivableReader>) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(HealthState {
            reader: reader.clone(),
        });

    for kind in [RecordKind::Invoice, RecordKind::CreditNote] {
        let service = Arc::new(RecordService::new(kind, reader.clone()));
        router = router.nest(kind.path(), handlers::records::router(service));
    }

    router
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
    /// Connect to the shared database and bind the listener. The schema is
    /// expected to exist already.
    pub async fn build(config: AnalysisConfig) -> Result<Self, AppError> {
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

        let router = build_router(Arc::new(db.clone()));

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Analysis service listener bound");

        Ok(Self {
            port,
            listener,
            db,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "analysis-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, self.router).await
    }
}
