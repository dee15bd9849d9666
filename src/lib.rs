//! # invoice-desk
//!
//! Invoice numbering, archival and retrieval for a single organization.
//!
//! ## Features
//!
//! - **Collision-free invoice numbers**: `GVA-YYYYMMDD-HHMMSS-NNNNNN`, with
//!   a session prefix and a 6-digit suffix never issued twice
//! - **Pluggable suffix registries**: in-memory or file-backed, selected by configuration
//! - **Append-only record store**: in-memory or SQLite, unique per invoice number
//! - **REST API**: list, fetch and create archived invoices
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoice_desk::prelude::*;
//!
//! let store = Arc::new(SqliteInvoiceStore::connect("sqlite://invoices.db").await?);
//! let registry = FileSuffixRegistry::open("used_invoice_suffixes.json")?;
//!
//! let mut session = InvoiceSession::start(Box::new(registry)).with_store(store.clone());
//! session.draft_mut().receiver.name = "Jane Doe".to_string();
//! session.draft_mut().add_item().amount = Decimal::new(1550, 2);
//!
//! let printed = session.print().await?;
//! println!("printed {}", printed.snapshot.invoice_number);
//! ```

pub mod allocator;
pub mod config;
pub mod core;
pub mod server;
pub mod session;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AllocationError, ConfigError, DraftInvoice, InvoiceError, InvoiceItem, InvoiceNumber,
        InvoicePrefix, InvoiceRecord, InvoiceResult, InvoiceStore, InvoiceSummary,
        NewInvoiceRecord, ReceiverInfo, RecordError, RecordPayload, StorageError, Suffix,
        SuffixRegistry, ValidationError,
    };

    // === Allocation and sessions ===
    pub use crate::allocator::InvoiceNumberAllocator;
    pub use crate::session::{InvoiceSession, PrintedInvoice};

    // === Storage ===
    pub use crate::storage::{FileSuffixRegistry, InMemoryInvoiceStore, InMemorySuffixRegistry};
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteInvoiceStore;

    // === Config ===
    pub use crate::config::{DeskConfig, RegistryBackend, RegistryConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{ApiResponse, AppState, ServerBuilder};

    // === External dependencies ===
    pub use rust_decimal::Decimal;
    pub use std::sync::Arc;
}
