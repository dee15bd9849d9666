//! Invoice number components
//!
//! An invoice number reads `GVA-YYYYMMDD-HHMMSS-NNNNNN`: a session prefix
//! derived from the session start time, followed by a 6-digit suffix.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Organization code every prefix starts with
pub const PREFIX_CODE: &str = "GVA";

/// Number of distinct suffixes (`000000` through `999999`)
pub const SUFFIX_SPACE: u32 = 1_000_000;

/// Width of the zero-padded suffix
const SUFFIX_DIGITS: usize = 6;

/// The 6-digit numeric component of an invoice number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Suffix(u32);

impl Suffix {
    /// Build a suffix, returning `None` when `value` is outside the suffix space
    pub fn new(value: u32) -> Option<Self> {
        (value < SUFFIX_SPACE).then_some(Self(value))
    }

    /// Map any index onto the suffix space
    pub(crate) fn wrapping(value: u32) -> Self {
        Self(value % SUFFIX_SPACE)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Error returned when parsing a suffix or invoice number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNumberError {
    input: String,
}

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid invoice number component: '{}'", self.input)
    }
}

impl std::error::Error for ParseNumberError {}

impl FromStr for Suffix {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SUFFIX_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseNumberError { input: s.to_string() });
        }
        // six ASCII digits always fit the suffix space
        s.parse::<u32>()
            .ok()
            .and_then(Suffix::new)
            .ok_or_else(|| ParseNumberError { input: s.to_string() })
    }
}

// Persisted as the zero-padded string so the registry file stays human-readable
impl Serialize for Suffix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Suffix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Session-scoped prefix, `GVA-YYYYMMDD-HHMMSS`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvoicePrefix(String);

impl InvoicePrefix {
    /// Prefix for a session that started at `started_at`
    pub fn at(started_at: NaiveDateTime) -> Self {
        Self(format!(
            "{}-{}",
            PREFIX_CODE,
            started_at.format("%Y%m%d-%H%M%S")
        ))
    }

    /// Prefix for a session starting now, in local time
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoicePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InvoicePrefix {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNumberError { input: s.to_string() };
        let stamp = s
            .strip_prefix(PREFIX_CODE)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(err)?;
        NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S").map_err(|_| err())?;
        Ok(Self(s.to_string()))
    }
}

/// A complete invoice number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvoiceNumber {
    prefix: InvoicePrefix,
    suffix: Suffix,
}

impl InvoiceNumber {
    pub fn new(prefix: InvoicePrefix, suffix: Suffix) -> Self {
        Self { prefix, suffix }
    }

    pub fn prefix(&self) -> &InvoicePrefix {
        &self.prefix
    }

    pub fn suffix(&self) -> Suffix {
        self.suffix
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.suffix)
    }
}

impl FromStr for InvoiceNumber {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, suffix) = s
            .rsplit_once('-')
            .ok_or_else(|| ParseNumberError { input: s.to_string() })?;
        Ok(Self {
            prefix: prefix.parse()?,
            suffix: suffix.parse()?,
        })
    }
}
