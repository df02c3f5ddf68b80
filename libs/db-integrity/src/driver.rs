//! Adapters from sqlx driver errors to [`RawIntegrityError`].
//!
//! The vendor is taken from the concrete driver error type, so no message
//! sniffing happens for errors coming through here.

use sqlx::error::DatabaseError;

use crate::codes::kind_from_code;
use crate::error::IntegrityParseError;
use crate::parser::parse;
use crate::types::{IntegrityViolationKind, ParseResult, RawIntegrityError, Vendor};

impl RawIntegrityError {
    /// Build a raw integrity error from a sqlx error.
    ///
    /// Fails with [`IntegrityParseError::UnknownVendor`] for non-database
    /// errors and for drivers without an enabled adapter.
    pub fn from_sqlx(err: &sqlx::Error) -> Result<Self, IntegrityParseError> {
        match err {
            sqlx::Error::Database(db) => Self::from_database_error(db.as_ref()),
            _ => Err(IntegrityParseError::UnknownVendor),
        }
    }

    pub fn from_database_error(db: &dyn DatabaseError) -> Result<Self, IntegrityParseError> {
        postgres_error(db)
            .or_else(|| sqlite_error(db))
            .ok_or(IntegrityParseError::UnknownVendor)
    }
}

/// Parse a sqlx error into a classification.
pub fn classify_sqlx(err: &sqlx::Error) -> Result<ParseResult, IntegrityParseError> {
    parse(&RawIntegrityError::from_sqlx(err)?)
}

/// Violation kind by driver error code, without looking at the message.
pub fn violation_kind(err: &sqlx::Error) -> Option<IntegrityViolationKind> {
    match err {
        sqlx::Error::Database(db) => db.code().and_then(|c| kind_from_code(c.as_ref())),
        _ => None,
    }
}

/// PostgreSQL reports the DETAIL line separately; rebuild the libpq text.
#[cfg_attr(not(feature = "pg"), allow(dead_code))]
pub(crate) fn postgres_message(message: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{message}\nDETAIL:  {detail}\n"),
        None => format!("{message}\n"),
    }
}

#[cfg(feature = "pg")]
fn postgres_error(db: &dyn DatabaseError) -> Option<RawIntegrityError> {
    let pg = db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>()?;
    Some(RawIntegrityError::from_vendor(
        Vendor::Postgres,
        postgres_message(pg.message(), pg.detail()),
    ))
}

#[cfg(not(feature = "pg"))]
fn postgres_error(_db: &dyn DatabaseError) -> Option<RawIntegrityError> {
    None
}

#[cfg(feature = "sqlite")]
fn sqlite_error(db: &dyn DatabaseError) -> Option<RawIntegrityError> {
    db.try_downcast_ref::<sqlx::sqlite::SqliteError>()?;
    Some(RawIntegrityError::from_vendor(Vendor::Sqlite, db.message()))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_error(_db: &dyn DatabaseError) -> Option<RawIntegrityError> {
    None
}
