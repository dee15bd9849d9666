//! invoice-desk server
//!
//! Reads its configuration from the YAML file named by `INVOICE_DESK_CONFIG`
//! (built-in defaults when unset) and serves the invoice API.

use anyhow::{Context, Result};
use invoice_desk::allocator::InvoiceNumberAllocator;
use invoice_desk::config::DeskConfig;
use invoice_desk::core::InvoicePrefix;
use invoice_desk::server::ServerBuilder;
use invoice_desk::storage::{SqliteInvoiceStore, open_registry};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "INVOICE_DESK_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invoice_desk=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => DeskConfig::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) => {
            tracing::info!("{} not set, using default configuration", CONFIG_ENV);
            DeskConfig::default_config()
        }
    };

    let store = SqliteInvoiceStore::connect(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;

    let registry = open_registry(&config.registry).context("opening suffix registry")?;
    let allocator = InvoiceNumberAllocator::from_boxed(InvoicePrefix::now(), registry);
    tracing::info!(
        prefix = %allocator.prefix(),
        issued = allocator.issued(),
        backend = ?config.registry.backend,
        "invoice numbering ready"
    );

    ServerBuilder::new()
        .with_store(store)
        .with_allocator(allocator)
        .serve(&config.server.bind)
        .await
}
