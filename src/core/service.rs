//! Service traits for suffix registries and invoice record stores

use crate::core::error::{InvoiceResult, StorageError};
use crate::core::invoice::{InvoiceRecord, InvoiceSummary, NewInvoiceRecord};
use crate::core::number::Suffix;
use async_trait::async_trait;

/// Set of every suffix issued so far
///
/// Implementations load their backing state once when constructed and keep
/// it in memory; [`persist`](SuffixRegistry::persist) writes the current set
/// back to durable storage.
pub trait SuffixRegistry: Send + Sync {
    /// Whether `suffix` has already been issued
    fn contains(&self, suffix: Suffix) -> bool;

    /// Number of issued suffixes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record `suffix` as issued. Returns `false` if it was already present.
    fn insert(&mut self, suffix: Suffix) -> bool;

    /// Write the current set to durable storage
    fn persist(&self) -> Result<(), StorageError>;
}

impl<R: SuffixRegistry + ?Sized> SuffixRegistry for Box<R> {
    fn contains(&self, suffix: Suffix) -> bool {
        (**self).contains(suffix)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn insert(&mut self, suffix: Suffix) -> bool {
        (**self).insert(suffix)
    }

    fn persist(&self) -> Result<(), StorageError> {
        (**self).persist()
    }
}

/// Append-only store of finalized invoices
///
/// Records are immutable once inserted; there is no update or delete.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a record and return its new id
    ///
    /// Fails with `RecordError::Conflict` if the invoice number is taken.
    async fn insert(&self, record: NewInvoiceRecord) -> InvoiceResult<i64>;

    /// All records, most recently created first
    async fn list_summaries(&self) -> InvoiceResult<Vec<InvoiceSummary>>;

    /// One full record with its payload parsed
    ///
    /// Fails with `RecordError::NotFound` for an unknown id.
    async fn get_by_id(&self, id: i64) -> InvoiceResult<InvoiceRecord>;

    /// Number of stored records
    async fn count(&self) -> InvoiceResult<usize>;
}
