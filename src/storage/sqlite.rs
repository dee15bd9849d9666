//! SQLite storage backend using sqlx.
//!
//! Provides `SqliteInvoiceStore`, an [`InvoiceStore`] backed by a single
//! `invoices` table.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (enabled by default).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE invoices (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     invoiceNumber TEXT UNIQUE,
//!     date TEXT,
//!     receiverName TEXT,
//!     totalAmount REAL,
//!     data TEXT,
//!     createdAt DATETIME DEFAULT CURRENT_TIMESTAMP
//! )
//! ```
//!
//! Uniqueness of `invoiceNumber` is enforced by the UNIQUE constraint, not
//! by application locking. The pool holds a single connection: the store is
//! meant for one writer process.

use crate::core::error::{InvoiceResult, RecordError, StorageError};
use crate::core::invoice::{InvoiceRecord, InvoiceSummary, NewInvoiceRecord, RecordPayload};
use crate::core::service::InvoiceStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use std::time::Duration;

/// Format used for `createdAt`; fixed width so text order matches time order
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const SUMMARY_COLUMNS: &str = "id, invoiceNumber, date, receiverName, totalAmount, createdAt";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Create the `invoices` table if it does not exist. Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoiceNumber TEXT UNIQUE,
            date TEXT,
            receiverName TEXT,
            totalAmount REAL,
            data TEXT,
            createdAt DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::Serialization {
            message: format!("invalid createdAt '{}': {}", raw, e),
        })
}

fn summary_from_row(row: &SqliteRow) -> Result<InvoiceSummary, StorageError> {
    let created_at: String = row.try_get("createdAt")?;

    Ok(InvoiceSummary {
        id: row.try_get("id")?,
        invoice_number: row
            .try_get::<Option<String>, _>("invoiceNumber")?
            .unwrap_or_default(),
        date: row.try_get::<Option<String>, _>("date")?.unwrap_or_default(),
        receiver_name: row
            .try_get::<Option<String>, _>("receiverName")?
            .unwrap_or_default(),
        total_amount: row
            .try_get::<Option<f64>, _>("totalAmount")?
            .unwrap_or_default(),
        created_at: parse_created_at(&created_at)?,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<InvoiceRecord, StorageError> {
    let summary = summary_from_row(row)?;
    let data = match row.try_get::<Option<String>, _>("data")? {
        Some(text) => RecordPayload::from_stored(&text),
        None => RecordPayload::Parsed(serde_json::Value::Null),
    };

    Ok(InvoiceRecord {
        id: summary.id,
        invoice_number: summary.invoice_number,
        date: summary.date,
        receiver_name: summary.receiver_name,
        total_amount: summary.total_amount,
        data,
        created_at: summary.created_at,
    })
}

// ---------------------------------------------------------------------------
// SqliteInvoiceStore
// ---------------------------------------------------------------------------

/// Invoice store backed by SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use invoice_desk::storage::SqliteInvoiceStore;
///
/// let store = SqliteInvoiceStore::connect("sqlite://invoices.db").await?;
/// let id = store.insert(record).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteInvoiceStore {
    pool: SqlitePool,
}

impl SqliteInvoiceStore {
    /// Wrap an existing pool. The schema must already exist; see [`ensure_schema`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `url` and apply the schema
    ///
    /// `sqlite::memory:` gives a private in-memory database, kept alive for
    /// the lifetime of the pool.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        ensure_schema(&pool).await?;
        tracing::info!(url, "connected to invoice database");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for SqliteInvoiceStore {
    async fn insert(&self, record: NewInvoiceRecord) -> InvoiceResult<i64> {
        let data = serde_json::to_string(&record.data).map_err(|e| {
            StorageError::Serialization {
                message: e.to_string(),
            }
        })?;
        let created_at = Utc::now().format(CREATED_AT_FORMAT).to_string();

        let result = sqlx::query(
            "INSERT INTO invoices (invoiceNumber, date, receiverName, totalAmount, data, createdAt)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.invoice_number)
        .bind(&record.date)
        .bind(&record.receiver_name)
        .bind(record.total_amount)
        .bind(data)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                tracing::debug!(id, invoice_number = %record.invoice_number, "stored invoice");
                Ok(id)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RecordError::Conflict {
                    invoice_number: record.invoice_number,
                }
                .into())
            }
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn list_summaries(&self) -> InvoiceResult<Vec<InvoiceSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices ORDER BY createdAt DESC, id DESC",
            SUMMARY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let summaries = rows
            .iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    async fn get_by_id(&self, id: i64) -> InvoiceResult<InvoiceRecord> {
        let row = sqlx::query(&format!(
            "SELECT {}, data FROM invoices WHERE id = ?",
            SUMMARY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?
        .ok_or(RecordError::NotFound { id })?;

        Ok(record_from_row(&row)?)
    }

    async fn count(&self) -> InvoiceResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }
}
