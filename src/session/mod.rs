//! Editing session for one invoice document
//!
//! A session fixes the invoice prefix and date when it starts, issues a
//! number immediately so the preview has something to show, and issues a
//! fresh number on every print. When a store is attached, each printed
//! invoice is archived under the number it was printed with.

use crate::allocator::InvoiceNumberAllocator;
use crate::config::DeskConfig;
use crate::core::error::{AllocationError, InvoiceResult, StorageError};
use crate::core::invoice::{DraftInvoice, format_invoice_date};
use crate::core::number::InvoicePrefix;
use crate::core::service::{InvoiceStore, SuffixRegistry};
use crate::storage::open_registry;
use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Default pause between re-stamping and printing
pub const DEFAULT_PRINT_DELAY: Duration = Duration::from_millis(50);

/// Result of a print action
#[derive(Debug, Clone, PartialEq)]
pub struct PrintedInvoice {
    /// The draft exactly as it was printed
    pub snapshot: DraftInvoice,
    pub total: Decimal,
    /// Id of the archived record, when a store is attached
    pub record_id: Option<i64>,
}

pub struct InvoiceSession {
    allocator: InvoiceNumberAllocator,
    draft: DraftInvoice,
    store: Option<Arc<dyn InvoiceStore>>,
    print_delay: Duration,
}

impl InvoiceSession {
    /// Start a session now
    pub fn start(registry: Box<dyn SuffixRegistry>) -> Self {
        Self::start_at(registry, Local::now().naive_local())
    }

    /// Start a session as if it began at `started_at`
    pub fn start_at(registry: Box<dyn SuffixRegistry>, started_at: NaiveDateTime) -> Self {
        let allocator = InvoiceNumberAllocator::from_boxed(InvoicePrefix::at(started_at), registry);
        Self::with_allocator(allocator, format_invoice_date(started_at))
    }

    /// Start a session now with the configured registry and print delay
    pub fn from_config(config: &DeskConfig) -> Result<Self, StorageError> {
        let registry = open_registry(&config.registry)?;
        Ok(Self::start(registry).with_print_delay(config.print_delay()))
    }

    /// Start a session over a prepared allocator
    pub fn with_allocator(allocator: InvoiceNumberAllocator, invoice_date: String) -> Self {
        let mut session = Self {
            allocator,
            draft: DraftInvoice::new(invoice_date),
            store: None,
            print_delay: DEFAULT_PRINT_DELAY,
        };
        if let Err(e) = session.restamp() {
            tracing::warn!(error = %e, "no invoice number available for new session");
        }
        session
    }

    /// Archive every printed invoice in `store`
    pub fn with_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_print_delay(mut self, delay: Duration) -> Self {
        self.print_delay = delay;
        self
    }

    pub fn print_delay(&self) -> Duration {
        self.print_delay
    }

    pub fn draft(&self) -> &DraftInvoice {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftInvoice {
        &mut self.draft
    }

    pub fn invoice_number(&self) -> &str {
        &self.draft.invoice_number
    }

    pub fn allocator(&self) -> &InvoiceNumberAllocator {
        &self.allocator
    }

    pub fn total(&self) -> Decimal {
        self.draft.total()
    }

    fn restamp(&mut self) -> Result<(), AllocationError> {
        let number = self.allocator.allocate()?;
        self.draft.invoice_number = number.to_string();
        Ok(())
    }

    /// Stamp a new number, wait for the display to catch up, then snapshot
    ///
    /// If no new number can be issued the last one is kept and printing goes
    /// ahead. Archival failures are returned to the caller.
    pub async fn print(&mut self) -> InvoiceResult<PrintedInvoice> {
        if let Err(e) = self.restamp() {
            tracing::warn!(
                error = %e,
                invoice_number = %self.draft.invoice_number,
                "printing with the previously issued invoice number"
            );
        }

        if !self.print_delay.is_zero() {
            tokio::time::sleep(self.print_delay).await;
        }

        let snapshot = self.draft.clone();
        let record_id = match &self.store {
            Some(store) => Some(store.insert(snapshot.to_record()?).await?),
            None => None,
        };

        tracing::info!(invoice_number = %snapshot.invoice_number, ?record_id, "invoice printed");

        Ok(PrintedInvoice {
            total: snapshot.total(),
            snapshot,
            record_id,
        })
    }
}
