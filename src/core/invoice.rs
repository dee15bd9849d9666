//! Invoice data model: the editable draft and the persisted record shapes

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::error::StorageError;

/// A single billed line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
}

impl InvoiceItem {
    /// Blank line with a fresh opaque id
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: String::new(),
            amount: Decimal::ZERO,
        }
    }
}

/// Who the invoice is issued to. Every field may be empty while editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// In-progress invoice held while the user edits it
///
/// The total is always derived from `items`; see [`DraftInvoice::total`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInvoice {
    pub receiver: ReceiverInfo,
    pub paid_by: String,
    pub items: Vec<InvoiceItem>,
    pub invoice_number: String,
    pub invoice_date: String,
}

impl DraftInvoice {
    /// Empty draft dated `invoice_date`
    pub fn new(invoice_date: impl Into<String>) -> Self {
        Self {
            receiver: ReceiverInfo::default(),
            paid_by: String::new(),
            items: Vec::new(),
            invoice_number: String::new(),
            invoice_date: invoice_date.into(),
        }
    }

    /// Append a blank line and return it
    pub fn add_item(&mut self) -> &mut InvoiceItem {
        self.items.push(InvoiceItem::blank());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Remove the line at `index`, if any
    pub fn remove_item(&mut self, index: usize) -> Option<InvoiceItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Replace the description of the line at `index`
    pub fn set_item_description(&mut self, index: usize, description: impl Into<String>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.description = description.into();
                true
            }
            None => false,
        }
    }

    /// Set the amount of the line at `index`; negative amounts clamp to zero
    pub fn set_item_amount(&mut self, index: usize, amount: Decimal) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.amount = amount.max(Decimal::ZERO);
                true
            }
            None => false,
        }
    }

    /// Set an amount from form input; anything that is not a number becomes zero
    pub fn set_item_amount_text(&mut self, index: usize, text: &str) -> bool {
        self.set_item_amount(index, parse_amount(text))
    }

    /// Sum of all line amounts
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Build the record payload for this draft as it stands
    pub fn to_record(&self) -> Result<NewInvoiceRecord, StorageError> {
        let data = serde_json::to_value(self).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        Ok(NewInvoiceRecord {
            invoice_number: self.invoice_number.clone(),
            date: self.invoice_date.clone(),
            receiver_name: self.receiver.name.clone(),
            total_amount: self.total().to_f64().unwrap_or_default(),
            data,
        })
    }
}

/// Parse a free-text amount from its leading number, ignoring trailing text
///
/// `"12abc"` is 12 and `"1e3"` is 1000. Empty, unparsable or negative input
/// yields zero.
pub fn parse_amount(text: &str) -> Decimal {
    let number = leading_number(text.trim_start());
    if number.starts_with('-') {
        return Decimal::ZERO;
    }
    let number = number.trim_start_matches('+');
    let number = if number.starts_with('.') {
        format!("0{}", number)
    } else {
        number.to_string()
    };

    let parsed = if number.contains(['e', 'E']) {
        Decimal::from_scientific(&number)
    } else {
        Decimal::from_str(&number)
    };
    parsed
        .ok()
        .filter(|amount| !amount.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// Longest prefix of `text` shaped like `[+-]digits[.digits][e[+-]digits]`
fn leading_number(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits_from(sign);
    let mut has_digits = end > sign;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + exp_sign);
        if exp_end > end + 1 + exp_sign {
            end = exp_end;
        }
    }

    &text[..end]
}

/// Format a session start the way invoices display it, e.g. `January 1, 2024 12:00 PM`
pub fn format_invoice_date(at: NaiveDateTime) -> String {
    at.format("%B %-d, %Y %I:%M %p").to_string()
}

/// Payload accepted by the store (and by `POST /api/invoices`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoiceRecord {
    pub invoice_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub receiver_name: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub data: Value,
}

/// Row returned by the history listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub date: String,
    pub receiver_name: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Stored snapshot, parsed back into JSON when possible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordPayload {
    Parsed(Value),
    /// Stored text that is not valid JSON, returned verbatim
    Raw(String),
}

impl RecordPayload {
    /// Parse stored text, keeping the raw form if it is not valid JSON
    pub fn from_stored(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => RecordPayload::Parsed(value),
            Err(e) => {
                tracing::warn!(error = %e, "stored invoice payload is not valid JSON; returning raw text");
                RecordPayload::Raw(text.to_string())
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RecordPayload::Parsed(value) => Some(value),
            RecordPayload::Raw(_) => None,
        }
    }

    /// Decode a parsed payload into a typed snapshot such as [`DraftInvoice`]
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        self.as_json()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// A complete stored invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: i64,
    pub invoice_number: String,
    pub date: String,
    pub receiver_name: String,
    pub total_amount: f64,
    pub data: RecordPayload,
    pub created_at: DateTime<Utc>,
}

impl InvoiceRecord {
    pub fn summary(&self) -> InvoiceSummary {
        InvoiceSummary {
            id: self.id,
            invoice_number: self.invoice_number.clone(),
            date: self.date.clone(),
            receiver_name: self.receiver_name.clone(),
            total_amount: self.total_amount,
            created_at: self.created_at,
        }
    }
}
