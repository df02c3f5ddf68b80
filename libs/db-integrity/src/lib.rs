//! Database integrity-error classification.
//!
//! Turns the text of a PostgreSQL or SQLite integrity error into an
//! [`IntegrityViolationKind`] plus the implicated column names.
//!
//! ```
//! use db_integrity::{parse, IntegrityViolationKind, RawIntegrityError};
//!
//! let err = RawIntegrityError::new("UNIQUE constraint failed: resource.a, resource.b");
//! let result = parse(&err).unwrap();
//! assert_eq!(result.kind, IntegrityViolationKind::UniqueConstraint);
//! assert_eq!(result.columns, vec!["a", "b"]);
//! ```
//!
//! # Features
//! - `sqlite` (default), `pg`: sqlx adapters that pick the vendor from the
//!   driver error type instead of the message text.

pub mod codes;
pub mod error;
pub mod parser;
pub mod postgres;
pub mod sqlite;
pub mod types;

#[cfg(any(feature = "pg", feature = "sqlite"))]
pub mod driver;

pub use codes::{is_integrity_violation_code, is_unique_violation_code, kind_from_code};
pub use error::IntegrityParseError;
pub use parser::{parse, IntegrityErrorParser, IntegrityParser};
pub use postgres::{
    PostgresCheckParser, PostgresNotNullParser, PostgresParser, PostgresUniqueConstraintParser,
};
pub use sqlite::{SqliteCheckParser, SqliteNotNullParser, SqliteParser, SqliteUniqueConstraintParser};
pub use types::{IntegrityViolationKind, ParseResult, RawIntegrityError, Vendor};

#[cfg(any(feature = "pg", feature = "sqlite"))]
pub use driver::{classify_sqlx, violation_kind};
