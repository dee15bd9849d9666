//! End-to-end: print invoices from a session, read them back over HTTP

#![cfg(feature = "sqlite")]

use axum_test::TestServer;
use chrono::NaiveDate;
use invoice_desk::prelude::*;
use serde_json::Value;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn test_printed_invoices_are_served_by_the_api() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn InvoiceStore> = Arc::new(
        SqliteInvoiceStore::connect(&format!(
            "sqlite://{}",
            dir.path().join("invoices.db").display()
        ))
        .await
        .unwrap(),
    );
    let registry = FileSuffixRegistry::open(dir.path().join("used_invoice_suffixes.json")).unwrap();

    let started = NaiveDate::from_ymd_opt(2025, 3, 4)
        .and_then(|d| d.and_hms_opt(9, 15, 0))
        .unwrap();
    let mut session = InvoiceSession::start_at(Box::new(registry), started)
        .with_store(store.clone())
        .with_print_delay(Duration::ZERO);

    session.draft_mut().receiver.name = "Jane Doe".to_string();
    session.draft_mut().paid_by = "Cash".to_string();
    for (description, amount) in [("Consulting", "10.00"), ("", "0"), ("Travel", "5.50")] {
        let draft = session.draft_mut();
        draft.add_item();
        let last = draft.items.len() - 1;
        draft.set_item_description(last, description);
        draft.set_item_amount_text(last, amount);
    }

    let first = session.print().await.unwrap();
    session.draft_mut().receiver.name = "John Roe".to_string();
    let second = session.print().await.unwrap();
    assert_ne!(first.snapshot.invoice_number, second.snapshot.invoice_number);

    let router = ServerBuilder::new().with_shared_store(store).build().unwrap();
    let server = TestServer::try_new(router).unwrap();

    let listed: Value = server.get("/api/invoices").await.json();
    let rows = listed["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["receiverName"], "John Roe");
    assert_eq!(rows[1]["receiverName"], "Jane Doe");

    let id = first.record_id.unwrap();
    let fetched: Value = server.get(&format!("/api/invoices/{}", id)).await.json();
    let record = &fetched["data"];
    assert_eq!(record["invoiceNumber"], first.snapshot.invoice_number.as_str());
    assert_eq!(record["date"], "March 4, 2025 09:15 AM");
    assert_eq!(record["totalAmount"], 15.5);
    assert_eq!(record["data"]["paidBy"], "Cash");
    assert_eq!(record["data"]["items"].as_array().map(Vec::len), Some(3));
    assert_eq!(record["data"]["items"][0]["description"], "Consulting");

    // Three numbers issued: one at session start, one per print
    let reopened = FileSuffixRegistry::open(dir.path().join("used_invoice_suffixes.json")).unwrap();
    assert_eq!(reopened.len(), 3);
}
