//! Typed error handling for invoice-desk
//!
//! Callers match on the specific failure instead of dealing with a generic
//! `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`AllocationError`]: the invoice-number suffix space is used up
//! - [`RecordError`]: record store contract violations (duplicate number, unknown id)
//! - [`StorageError`]: failures of the underlying storage backend
//! - [`ValidationError`]: malformed requests
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match store.get_by_id(id).await {
//!     Ok(record) => println!("{}", record.invoice_number),
//!     Err(InvoiceError::Record(RecordError::NotFound { id })) => {
//!         println!("no invoice {}", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result alias used across the crate
pub type InvoiceResult<T> = Result<T, InvoiceError>;

/// The main error type for invoice-desk
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Invoice number allocation failed
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Record store contract violation
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Storage backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Malformed request input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error body returned by the HTTP layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: &'static str,
}

impl InvoiceError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::Allocation(_) => StatusCode::SERVICE_UNAVAILABLE,
            InvoiceError::Record(e) => e.status_code(),
            InvoiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            InvoiceError::Validation(_) => StatusCode::BAD_REQUEST,
            InvoiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::Allocation(_) => "SUFFIX_SPACE_EXHAUSTED",
            InvoiceError::Record(e) => e.error_code(),
            InvoiceError::Storage(_) => "STORAGE_ERROR",
            InvoiceError::Validation(_) => "VALIDATION_ERROR",
            InvoiceError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        }
    }
}

impl IntoResponse for InvoiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "request failed: {}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Allocation Errors
// =============================================================================

/// Errors raised while issuing invoice numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Every suffix in the space has already been issued
    #[error("all {capacity} invoice suffixes have been issued")]
    Exhausted { capacity: u32 },
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to invoice record operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// An invoice with the same number is already stored
    #[error("invoice number '{invoice_number}' already exists")]
    Conflict { invoice_number: String },

    /// No invoice with the requested id
    #[error("Invoice not found")]
    NotFound { id: i64 },
}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::Conflict { .. } => StatusCode::CONFLICT,
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::Conflict { .. } => "INVOICE_NUMBER_CONFLICT",
            RecordError::NotFound { .. } => "INVOICE_NOT_FOUND",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    Query { backend: String, message: String },

    /// Failed to encode or decode persisted data
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Lock poisoned by a panicking writer
    #[error("storage lock poisoned: {message}")]
    Poisoned { message: String },

    /// Blocking storage work panicked or was cancelled
    #[error("storage task failed: {message}")]
    Task { message: String },
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        StorageError::Poisoned {
            message: err.to_string(),
        }
    }

    pub(crate) fn task(err: tokio::task::JoinError) -> Self {
        StorageError::Task {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Query {
            backend: "sqlite".to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to request validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Request body was not the expected JSON
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Path id was not an integer
    #[error("Invalid invoice id: {value}")]
    InvalidId { value: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to parse configuration
    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}
