//! HTTP handlers for invoice records
//!
//! Successful responses are wrapped as `{"message": "success", "data": ...}`;
//! failures render as `{"error": "..."}` with a non-2xx status (see
//! [`InvoiceError`]'s `IntoResponse`).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::allocator::InvoiceNumberAllocator;
use crate::core::error::{InvoiceError, StorageError, ValidationError};
use crate::core::invoice::{InvoiceRecord, InvoiceSummary, NewInvoiceRecord};
use crate::core::service::InvoiceStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
}

/// State for the numbering route
#[derive(Clone)]
pub struct NumberingState {
    pub allocator: Arc<Mutex<InvoiceNumberAllocator>>,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            message: "success",
            data,
        })
    }
}

/// Response body for a created invoice
#[derive(Debug, Serialize)]
pub struct CreatedInvoice {
    pub id: i64,
}

/// Response body for an issued invoice number
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedNumber {
    pub invoice_number: String,
}

/// GET /api/invoices
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<InvoiceSummary>>>, InvoiceError> {
    let summaries = state.store.list_summaries().await?;
    Ok(ApiResponse::success(summaries))
}

/// GET /api/invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InvoiceRecord>>, InvoiceError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ValidationError::InvalidId { value: id.clone() })?;

    let record = state.store.get_by_id(id).await?;
    Ok(ApiResponse::success(record))
}

/// POST /api/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<NewInvoiceRecord>, JsonRejection>,
) -> Result<Json<ApiResponse<CreatedInvoice>>, InvoiceError> {
    let Json(record) = payload.map_err(|rejection| ValidationError::InvalidJson {
        message: rejection.body_text(),
    })?;

    let id = state.store.insert(record).await?;
    Ok(ApiResponse::success(CreatedInvoice { id }))
}

/// POST /api/invoice-numbers
///
/// Issues the next number for this server's session prefix. Allocation may
/// rewrite the registry file, so it runs on the blocking pool.
pub async fn allocate_number(
    State(state): State<NumberingState>,
) -> Result<Json<ApiResponse<AllocatedNumber>>, InvoiceError> {
    let allocator = Arc::clone(&state.allocator);
    let number = tokio::task::spawn_blocking(move || -> Result<_, InvoiceError> {
        let mut allocator = allocator.lock().map_err(StorageError::poisoned)?;
        Ok(allocator.allocate()?)
    })
    .await
    .map_err(StorageError::task)??;

    Ok(ApiResponse::success(AllocatedNumber {
        invoice_number: number.to_string(),
    }))
}
