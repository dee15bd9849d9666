//! ServerBuilder for fluent API to build the HTTP server

use super::handlers::{AppState, NumberingState};
use super::router::{build_invoice_routes, build_numbering_routes, health_routes};
use crate::allocator::InvoiceNumberAllocator;
use crate::core::service::InvoiceStore;
use anyhow::Result;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the invoice HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryInvoiceStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn InvoiceStore>>,
    allocator: Option<InvoiceNumberAllocator>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            allocator: None,
        }
    }

    /// Set the record store (required)
    pub fn with_store(mut self, store: impl InvoiceStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a record store that is also used elsewhere, e.g. by an [`InvoiceSession`](crate::session::InvoiceSession)
    pub fn with_shared_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Expose `POST /api/invoice-numbers` backed by `allocator`
    pub fn with_allocator(mut self, allocator: InvoiceNumberAllocator) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Build the final router
    ///
    /// Requests are traced, and CORS is permissive so a browser UI served
    /// from another origin can call the API.
    pub fn build(mut self) -> Result<Router> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("InvoiceStore is required. Call .with_store()"))?;

        let mut app = health_routes().merge(build_invoice_routes(AppState { store }));
        if let Some(allocator) = self.allocator.take() {
            app = app.merge(build_numbering_routes(NumberingState {
                allocator: Arc::new(Mutex::new(allocator)),
            }));
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
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

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryInvoiceStore;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.allocator.is_none());
    }

    #[test]
    fn test_with_store_sets_store() {
        let builder = ServerBuilder::new().with_store(InMemoryInvoiceStore::new());
        assert!(builder.store.is_some());
    }

    #[test]
    fn test_build_without_store_fails() {
        let result = ServerBuilder::new().build();
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(
            err_msg.contains("InvoiceStore is required"),
            "error should mention InvoiceStore: {}",
            err_msg
        );
    }

    #[test]
    fn test_build_produces_router() {
        let router = ServerBuilder::new()
            .with_store(InMemoryInvoiceStore::new())
            .build()
            .expect("build should produce a Router");
        let _ = router;
    }
}
