//! HTTP server exposing the invoice record store
//!
//! - `GET /api/invoices` lists summaries
//! - `GET /api/invoices/{id}` returns one record with its snapshot parsed
//! - `POST /api/invoices` stores a finalized invoice
//! - `POST /api/invoice-numbers` issues a number, when an allocator is configured

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::{AllocatedNumber, ApiResponse, AppState, CreatedInvoice, NumberingState};
