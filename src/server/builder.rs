//! ListServerBuilder for fluent API to build HTTP servers

use super::rest::{ListState, RestExposure};
use crate::config::EngineConfig;
use crate::core::service::RecordSource;
use anyhow::Result;
use axum::Router;
use axum::http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers over named record sources
///
/// # Example
///
/// ```ignore
/// let app = ListServerBuilder::new()
///     .register_source("reviews", InMemoryRecordSource::with_records(reviews))
///     .build()?;
/// ```
pub struct ListServerBuilder {
    config: EngineConfig,
    sources: HashMap<String, Arc<dyn RecordSource>>,
    custom_routes: Vec<Router>,
    permissive_cors: bool,
}

impl ListServerBuilder {
    /// Create a new ListServerBuilder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            sources: HashMap::new(),
            custom_routes: Vec::new(),
            permissive_cors: false,
        }
    }

    /// Use this configuration (export delimiter, headers, sheet name...)
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Expose a record source under `/{name}` and `/{name}/export`
    ///
    /// Registering the same name twice replaces the earlier source.
    pub fn register_source(
        mut self,
        name: impl Into<String>,
        source: impl RecordSource + 'static,
    ) -> Self {
        let name = name.into();
        tracing::debug!(resource = %name, "Record source registered");
        self.sources.insert(name, Arc::new(source));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that don't fit the listing pattern, such as
    /// bulk moderation actions (`POST /reviews/bulk-delete`).
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Allow any origin to call the API (local dashboard development)
    pub fn with_permissive_cors(mut self) -> Self {
        self.permissive_cors = true;
        self
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        self.config.validate()?;
        if self.sources.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one record source is required. Call .register_source()"
            ));
        }

        let state = ListState {
            sources: Arc::new(self.sources),
            config: Arc::new(self.config),
        };
        let mut app =
            RestExposure::build_router(state, self.custom_routes).layer(TraceLayer::new_for_http());

        if self.permissive_cors {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST])
                    .allow_headers(Any),
            );
        }
        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ListServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
