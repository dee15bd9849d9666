//! Core module containing the invoice data model, error types and service traits

pub mod error;
pub mod invoice;
pub mod number;
pub mod service;

pub use error::{
    AllocationError, ConfigError, InvoiceError, InvoiceResult, RecordError, StorageError,
    ValidationError,
};
pub use invoice::{
    DraftInvoice, InvoiceItem, InvoiceRecord, InvoiceSummary, NewInvoiceRecord, ReceiverInfo,
    RecordPayload,
};
pub use number::{InvoiceNumber, InvoicePrefix, SUFFIX_SPACE, Suffix};
pub use service::{InvoiceStore, SuffixRegistry};
