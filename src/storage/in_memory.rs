//! In-memory implementations of the registry and record store, for testing and ephemeral sessions

use crate::core::error::{InvoiceResult, RecordError, StorageError};
use crate::core::invoice::{InvoiceRecord, InvoiceSummary, NewInvoiceRecord, RecordPayload};
use crate::core::number::Suffix;
use crate::core::service::{InvoiceStore, SuffixRegistry};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Suffix registry that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct InMemorySuffixRegistry {
    suffixes: HashSet<Suffix>,
}

impl InMemorySuffixRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<Suffix> for InMemorySuffixRegistry {
    fn from_iter<I: IntoIterator<Item = Suffix>>(iter: I) -> Self {
        Self {
            suffixes: iter.into_iter().collect(),
        }
    }
}

impl SuffixRegistry for InMemorySuffixRegistry {
    fn contains(&self, suffix: Suffix) -> bool {
        self.suffixes.contains(&suffix)
    }

    fn len(&self) -> usize {
        self.suffixes.len()
    }

    fn insert(&mut self, suffix: Suffix) -> bool {
        self.suffixes.insert(suffix)
    }

    fn persist(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Default)]
struct Table {
    next_id: i64,
    // id -> (record, stored payload text)
    rows: BTreeMap<i64, (InvoiceRecord, String)>,
}

/// In-memory invoice store
///
/// Uses RwLock for thread-safe access. Payloads are kept as serialized text
/// so reads go through the same parse-or-raw path as the SQLite backend.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, record: NewInvoiceRecord) -> InvoiceResult<i64> {
        let stored = serde_json::to_string(&record.data).map_err(|e| {
            StorageError::Serialization {
                message: e.to_string(),
            }
        })?;

        let mut table = self.table.write().map_err(StorageError::poisoned)?;

        if table
            .rows
            .values()
            .any(|(row, _)| row.invoice_number == record.invoice_number)
        {
            return Err(RecordError::Conflict {
                invoice_number: record.invoice_number,
            }
            .into());
        }

        table.next_id += 1;
        let id = table.next_id;
        let row = InvoiceRecord {
            id,
            invoice_number: record.invoice_number,
            date: record.date,
            receiver_name: record.receiver_name,
            total_amount: record.total_amount,
            data: RecordPayload::Parsed(record.data),
            created_at: Utc::now(),
        };
        table.rows.insert(id, (row, stored));

        Ok(id)
    }

    async fn list_summaries(&self) -> InvoiceResult<Vec<InvoiceSummary>> {
        let table = self.table.read().map_err(StorageError::poisoned)?;

        let mut summaries: Vec<InvoiceSummary> =
            table.rows.values().map(|(row, _)| row.summary()).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(summaries)
    }

    async fn get_by_id(&self, id: i64) -> InvoiceResult<InvoiceRecord> {
        let table = self.table.read().map_err(StorageError::poisoned)?;

        let (row, stored) = table.rows.get(&id).ok_or(RecordError::NotFound { id })?;

        Ok(InvoiceRecord {
            data: RecordPayload::from_stored(stored),
            ..row.clone()
        })
    }

    async fn count(&self) -> InvoiceResult<usize> {
        let table = self.table.read().map_err(StorageError::poisoned)?;
        Ok(table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::InvoiceError;
    use serde_json::json;

    fn new_record(number: &str, receiver: &str, total: f64) -> NewInvoiceRecord {
        NewInvoiceRecord {
            invoice_number: number.to_string(),
            date: "Jan 1, 2024".to_string(),
            receiver_name: receiver.to_string(),
            total_amount: total,
            data: json!({"receiver": {"name": receiver}, "items": []}),
        }
    }

    #[test]
    fn test_registry_insert_and_contains() {
        let mut registry = InMemorySuffixRegistry::new();
        let suffix = Suffix::new(123).unwrap();

        assert!(registry.is_empty());
        assert!(registry.insert(suffix));
        assert!(!registry.insert(suffix));
        assert!(registry.contains(suffix));
        assert_eq!(registry.len(), 1);
        assert!(registry.persist().is_ok());
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryInvoiceStore::new();

        let first = store.insert(new_record("A-000001", "Jane", 1.0)).await.unwrap();
        let second = store.insert(new_record("A-000002", "John", 2.0)).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_round_trip_payload() {
        let store = InMemoryInvoiceStore::new();
        let record = new_record("A-000001", "Jane Doe", 15.5);

        let id = store.insert(record.clone()).await.unwrap();
        let fetched = store.get_by_id(id).await.unwrap();

        assert_eq!(fetched.receiver_name, "Jane Doe");
        assert_eq!(fetched.total_amount, 15.5);
        assert_eq!(fetched.data.as_json(), Some(&record.data));
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let store = InMemoryInvoiceStore::new();
        store.insert(new_record("A-000001", "Jane", 1.0)).await.unwrap();

        let err = store
            .insert(new_record("A-000001", "Someone else", 9.0))
            .await
            .unwrap_err();

        assert!(matches!(err, InvoiceError::Record(RecordError::Conflict { .. })));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_id_not_found() {
        let store = InMemoryInvoiceStore::new();
        let err = store.get_by_id(42).await.unwrap_err();
        assert!(matches!(
            err,
            InvoiceError::Record(RecordError::NotFound { id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryInvoiceStore::new();
        assert!(store.list_summaries().await.unwrap().is_empty());

        store.insert(new_record("A-000001", "First", 1.0)).await.unwrap();
        store.insert(new_record("A-000002", "Second", 2.0)).await.unwrap();

        let list = store.list_summaries().await.unwrap();
        let names: Vec<&str> = list.iter().map(|s| s.receiver_name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
