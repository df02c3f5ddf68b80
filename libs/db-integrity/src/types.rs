use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IntegrityParseError;

/// Kind of constraint a database rejected a write for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrityViolationKind {
    UniqueConstraint,
    NotNullConstraint,
    CheckConstraint,
}

impl IntegrityViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniqueConstraint => "UNIQUE_CONSTRAINT",
            Self::NotNullConstraint => "NOT_NULL_CONSTRAINT",
            Self::CheckConstraint => "CHECK_CONSTRAINT",
        }
    }
}

impl fmt::Display for IntegrityViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database engines whose integrity error text can be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Postgres,
    Sqlite,
}

impl Vendor {
    /// Detect the vendor from a DSN scheme (`postgres://`, `sqlite://`, ...).
    pub fn from_dsn(dsn: &str) -> Option<Self> {
        let scheme = dsn.trim().split_once(':').map(|(s, _)| s)?;
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single integrity error.
///
/// `columns` is never empty and keeps the order in which the driver listed
/// the columns. For check constraints it holds the constraint name instead,
/// since a check may span several columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub kind: IntegrityViolationKind,
    pub columns: Vec<String>,
}

impl ParseResult {
    pub fn new(kind: IntegrityViolationKind, columns: Vec<String>) -> Self {
        Self { kind, columns }
    }

    pub fn into_parts(self) -> (IntegrityViolationKind, Vec<String>) {
        (self.kind, self.columns)
    }
}

/// An integrity error as raised by a database driver.
///
/// Carries the raw message arguments and, when the raising driver is known,
/// its vendor. Without a vendor the dispatcher sniffs the message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawIntegrityError {
    args: Vec<String>,
    vendor: Option<Vendor>,
}

impl RawIntegrityError {
    /// Single-message error of unknown origin.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            args: vec![message.into()],
            vendor: None,
        }
    }

    /// Single-message error raised by a known driver.
    pub fn from_vendor(vendor: Vendor, message: impl Into<String>) -> Self {
        Self {
            args: vec![message.into()],
            vendor: Some(vendor),
        }
    }

    /// Error with an arbitrary argument list. Anything but exactly one
    /// argument is rejected at parse time.
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            vendor: None,
        }
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: Vendor) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn vendor(&self) -> Option<Vendor> {
        self.vendor
    }

    /// The single message argument.
    pub fn message(&self) -> Result<&str, IntegrityParseError> {
        match self.args.as_slice() {
            [message] => Ok(message.as_str()),
            args => Err(IntegrityParseError::MultipleArgs { count: args.len() }),
        }
    }
}
