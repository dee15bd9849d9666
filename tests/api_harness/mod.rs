//! Shared test harness for the invoice HTTP API
//!
//! The `invoice_api_tests!` macro generates the same HTTP contract suite for
//! every `InvoiceStore` backend.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod api_harness;
//!
//! use invoice_desk::storage::InMemoryInvoiceStore;
//!
//! invoice_api_tests!(InMemoryInvoiceStore::new());
//! ```

#![allow(dead_code)]

use axum_test::TestServer;
use invoice_desk::core::service::InvoiceStore;
use invoice_desk::server::ServerBuilder;
use serde_json::{Value, json};

/// Build a test server over `store` with only the record routes
pub fn server_for(store: impl InvoiceStore + 'static) -> TestServer {
    let router = ServerBuilder::new()
        .with_store(store)
        .build()
        .expect("router should build");
    TestServer::try_new(router).expect("test server should start")
}

/// A finalized invoice as a client would POST it
pub fn invoice_body(invoice_number: &str, receiver_name: &str, total_amount: f64) -> Value {
    json!({
        "invoiceNumber": invoice_number,
        "date": "March 4, 2025 09:15 AM",
        "receiverName": receiver_name,
        "totalAmount": total_amount,
        "data": {
            "receiver": { "name": receiver_name, "address": "12 Quay Street", "phone": "555-0100" },
            "paidBy": "Card",
            "items": [
                { "id": "a", "description": "Consulting", "amount": 10.0 },
                { "id": "b", "description": "", "amount": 0 },
                { "id": "c", "description": "Travel", "amount": 5.5 }
            ],
            "invoiceNumber": invoice_number,
            "invoiceDate": "March 4, 2025 09:15 AM"
        }
    })
}

/// Generate the HTTP contract suite for an `InvoiceStore`
///
/// `$factory` is evaluated once per test inside an async context, so it may
/// `.await`.
#[macro_export]
macro_rules! invoice_api_tests {
    ($factory:expr) => {
        mod invoice_api_contract_tests {
            use super::*;
            use axum::http::StatusCode;
            use serde_json::Value;
            use $crate::api_harness::{invoice_body, server_for};

            #[tokio::test]
            async fn test_list_is_empty_initially() {
                let server = server_for($factory);

                let response = server.get("/api/invoices").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "success");
                assert_eq!(body["data"], serde_json::json!([]));
            }

            #[tokio::test]
            async fn test_create_then_fetch() {
                let server = server_for($factory);

                let response = server
                    .post("/api/invoices")
                    .json(&invoice_body("GVA-20250304-091500-123456", "Jane Doe", 15.5))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["message"], "success");
                let id = body["data"]["id"].as_i64().expect("id should be an integer");
                assert!(id >= 1);

                let response = server.get(&format!("/api/invoices/{}", id)).await;
                response.assert_status_ok();
                let body: Value = response.json();
                let record = &body["data"];
                assert_eq!(record["id"], id);
                assert_eq!(record["invoiceNumber"], "GVA-20250304-091500-123456");
                assert_eq!(record["receiverName"], "Jane Doe");
                assert_eq!(record["totalAmount"], 15.5);
                assert_eq!(record["date"], "March 4, 2025 09:15 AM");
                assert_eq!(record["data"]["paidBy"], "Card");
                assert_eq!(record["data"]["items"][2]["description"], "Travel");
                assert!(record["createdAt"].is_string());
            }

            #[tokio::test]
            async fn test_list_returns_summaries_without_payload() {
                let server = server_for($factory);
                server
                    .post("/api/invoices")
                    .json(&invoice_body("GVA-20250304-091500-000001", "Jane Doe", 15.5))
                    .await
                    .assert_status_ok();

                let body: Value = server.get("/api/invoices").await.json();
                let rows = body["data"].as_array().expect("data should be an array");
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["invoiceNumber"], "GVA-20250304-091500-000001");
                assert_eq!(rows[0]["receiverName"], "Jane Doe");
                assert!(rows[0].get("data").is_none());
            }

            #[tokio::test]
            async fn test_list_is_newest_first() {
                let server = server_for($factory);
                for (suffix, name) in [("000001", "First"), ("000002", "Second"), ("000003", "Third")] {
                    server
                        .post("/api/invoices")
                        .json(&invoice_body(&format!("GVA-20250304-091500-{}", suffix), name, 1.0))
                        .await
                        .assert_status_ok();
                }

                let body: Value = server.get("/api/invoices").await.json();
                let names: Vec<&str> = body["data"]
                    .as_array()
                    .expect("data should be an array")
                    .iter()
                    .map(|row| row["receiverName"].as_str().unwrap_or_default())
                    .collect();
                assert_eq!(names, vec!["Third", "Second", "First"]);
            }

            #[tokio::test]
            async fn test_duplicate_number_is_conflict() {
                let server = server_for($factory);
                let body = invoice_body("GVA-20250304-091500-424242", "Jane Doe", 15.5);

                server.post("/api/invoices").json(&body).await.assert_status_ok();
                let response = server.post("/api/invoices").json(&body).await;
                response.assert_status(StatusCode::CONFLICT);
                let error: Value = response.json();
                assert_eq!(error["code"], "INVOICE_NUMBER_CONFLICT");

                let listed: Value = server.get("/api/invoices").await.json();
                assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
            }

            #[tokio::test]
            async fn test_unknown_id_is_not_found() {
                let server = server_for($factory);

                let response = server.get("/api/invoices/999").await;
                response.assert_status(StatusCode::NOT_FOUND);
                let error: Value = response.json();
                assert_eq!(error["error"], "Invoice not found");
            }

            #[tokio::test]
            async fn test_non_numeric_id_is_bad_request() {
                let server = server_for($factory);

                let response = server.get("/api/invoices/abc").await;
                response.assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_malformed_body_is_bad_request() {
                let server = server_for($factory);

                let response = server
                    .post("/api/invoices")
                    .text("{not json")
                    .content_type("application/json")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let listed: Value = server.get("/api/invoices").await.json();
                assert_eq!(listed["data"], serde_json::json!([]));
            }

            #[tokio::test]
            async fn test_health_route() {
                let server = server_for($factory);

                let body: Value = server.get("/health").await.json();
                assert_eq!(body["status"], "ok");
                assert_eq!(body["service"], "invoice-desk");
            }
        }
    };
}
