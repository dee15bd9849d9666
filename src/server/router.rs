//! Router builder utilities for invoice routes

use crate::server::handlers::{
    AppState, NumberingState, allocate_number, create_invoice, get_invoice, list_invoices,
};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

/// Build the invoice routes
///
/// - GET /api/invoices - List summaries, newest first
/// - POST /api/invoices - Store a finalized invoice
/// - GET /api/invoices/{id} - Get one invoice with its snapshot
pub fn build_invoice_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route("/api/invoices/{id}", get(get_invoice))
        .with_state(state)
}

/// Build the numbering route
///
/// - POST /api/invoice-numbers - Issue the next invoice number
pub fn build_numbering_routes(state: NumberingState) -> Router {
    Router::new()
        .route("/api/invoice-numbers", post(allocate_number))
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "invoice-desk"
    }))
}
