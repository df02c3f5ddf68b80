//! Parser seam and the vendor dispatcher.

use regex::{Captures, Regex};

use crate::error::IntegrityParseError;
use crate::postgres::PostgresParser;
use crate::sqlite::SqliteParser;
use crate::types::{IntegrityViolationKind, ParseResult, RawIntegrityError, Vendor};

/// Anything that turns a raw integrity error into a classification.
pub trait IntegrityParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError>;
}

/// Top-level parser: routes to the vendor parser by the raising driver, or
/// by sniffing the message when the driver is unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegrityErrorParser;

impl IntegrityErrorParser {
    /// Guess the vendor from the message shape alone.
    pub fn sniff_vendor(message: &str) -> Option<Vendor> {
        if PostgresParser::recognizes(message) {
            Some(Vendor::Postgres)
        } else if SqliteParser::recognizes(message) {
            Some(Vendor::Sqlite)
        } else {
            None
        }
    }
}

impl IntegrityParser for IntegrityErrorParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        let message = error.message()?;

        let vendor = match error.vendor() {
            Some(vendor) => vendor,
            None => Self::sniff_vendor(message).ok_or(IntegrityParseError::UnknownVendor)?,
        };

        let result = match vendor {
            Vendor::Postgres => PostgresParser.parse(error)?,
            Vendor::Sqlite => SqliteParser.parse(error)?,
        };

        tracing::debug!(
            vendor = %vendor,
            kind = %result.kind,
            columns = ?result.columns,
            "classified integrity error"
        );

        Ok(result)
    }
}

/// Classify an integrity error with the default dispatcher.
pub fn parse(error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
    IntegrityErrorParser.parse(error)
}

// -------- shared helpers for the vendor parsers --------

pub(crate) fn captures<'m>(
    pattern: &Regex,
    message: &'m str,
    vendor: Vendor,
    kind: IntegrityViolationKind,
) -> Result<Captures<'m>, IntegrityParseError> {
    pattern
        .captures(message)
        .ok_or_else(|| IntegrityParseError::pattern_not_found(vendor, kind))
}

pub(crate) fn group<'m>(
    caps: &Captures<'m>,
    name: &str,
    vendor: Vendor,
    kind: IntegrityViolationKind,
) -> Result<&'m str, IntegrityParseError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| IntegrityParseError::no_columns(vendor, kind))
}

/// Split a `", "`-separated column list, dropping empty entries.
pub(crate) fn split_columns(
    columns_string: &str,
    vendor: Vendor,
    kind: IntegrityViolationKind,
) -> Result<Vec<&str>, IntegrityParseError> {
    let columns: Vec<&str> = columns_string
        .split(", ")
        .filter(|c| !c.trim().is_empty())
        .collect();

    if columns.is_empty() {
        return Err(IntegrityParseError::no_columns(vendor, kind));
    }

    Ok(columns)
}
