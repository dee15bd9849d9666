//! Storage implementations for suffix registries and invoice records

pub mod file_registry;
pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_registry::FileSuffixRegistry;
pub use in_memory::{InMemoryInvoiceStore, InMemorySuffixRegistry};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteInvoiceStore;

use crate::config::{RegistryBackend, RegistryConfig};
use crate::core::error::StorageError;
use crate::core::service::SuffixRegistry;

/// Open the suffix registry selected by configuration
pub fn open_registry(config: &RegistryConfig) -> Result<Box<dyn SuffixRegistry>, StorageError> {
    match config.backend {
        RegistryBackend::Memory => Ok(Box::new(InMemorySuffixRegistry::new())),
        RegistryBackend::File => Ok(Box::new(FileSuffixRegistry::open(&config.path)?)),
    }
}
