//! SQLite integrity error messages, e.g. `UNIQUE constraint failed: resource.a, resource.b`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::IntegrityParseError;
use crate::parser::{captures, group, IntegrityParser};
use crate::types::{IntegrityViolationKind, ParseResult, RawIntegrityError, Vendor};

const UNIQUE_PREFIX: &str = "UNIQUE constraint failed";
const NOT_NULL_PREFIX: &str = "NOT NULL constraint failed";
const CHECK_PREFIX: &str = "CHECK constraint failed";

static UNIQUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^UNIQUE constraint failed: (?P<columns_string>.*)")
        .expect("valid sqlite unique pattern")
});

static NOT_NULL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^NOT NULL constraint failed: (?P<column_string>.*)")
        .expect("valid sqlite not-null pattern")
});

static CHECK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CHECK constraint failed: (?P<constraint_name>.*)")
        .expect("valid sqlite check pattern")
});

/// `table.column` → `column`. Anything but exactly two parts is rejected.
fn bare_column(qualified: &str) -> Result<&str, IntegrityParseError> {
    let parts: Vec<&str> = qualified.split('.').collect();
    match parts.as_slice() {
        [_, column] => Ok(*column),
        _ => Err(IntegrityParseError::ColumnNotParsable {
            column: qualified.to_owned(),
        }),
    }
}

/// `UNIQUE constraint failed: t.a, t.b`
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteUniqueConstraintParser;

impl IntegrityParser for SqliteUniqueConstraintParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::UniqueConstraint;

        let message = error.message()?;
        let caps = captures(&UNIQUE_PATTERN, message, Vendor::Sqlite, KIND)?;
        let columns_string = group(&caps, "columns_string", Vendor::Sqlite, KIND)?;

        if columns_string.is_empty() {
            return Err(IntegrityParseError::no_columns(Vendor::Sqlite, KIND));
        }

        // Every entry must be `table.column`, empty ones included.
        let columns = columns_string
            .split(", ")
            .map(|c| bare_column(c).map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParseResult::new(KIND, columns))
    }
}

/// `NOT NULL constraint failed: t.a`
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteNotNullParser;

impl IntegrityParser for SqliteNotNullParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::NotNullConstraint;

        let message = error.message()?;
        let caps = captures(&NOT_NULL_PATTERN, message, Vendor::Sqlite, KIND)?;
        let column_string = group(&caps, "column_string", Vendor::Sqlite, KIND)?;
        if column_string.is_empty() {
            return Err(IntegrityParseError::no_columns(Vendor::Sqlite, KIND));
        }

        Ok(ParseResult::new(
            KIND,
            vec![bare_column(column_string)?.to_owned()],
        ))
    }
}

/// `CHECK constraint failed: name`
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteCheckParser;

impl IntegrityParser for SqliteCheckParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::CheckConstraint;

        let message = error.message()?;
        let caps = captures(&CHECK_PATTERN, message, Vendor::Sqlite, KIND)?;
        let constraint_name = group(&caps, "constraint_name", Vendor::Sqlite, KIND)?;
        if constraint_name.is_empty() {
            return Err(IntegrityParseError::no_columns(Vendor::Sqlite, KIND));
        }

        Ok(ParseResult::new(KIND, vec![constraint_name.to_owned()]))
    }
}

/// Routes a SQLite message to the matching sub-parser by prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteParser;

impl SqliteParser {
    pub(crate) fn recognizes(message: &str) -> bool {
        [NOT_NULL_PREFIX, UNIQUE_PREFIX, CHECK_PREFIX]
            .iter()
            .any(|prefix| message.starts_with(prefix))
    }
}

impl IntegrityParser for SqliteParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        let message = error.message()?;

        if message.starts_with(NOT_NULL_PREFIX) {
            return SqliteNotNullParser.parse(error);
        }

        if message.starts_with(UNIQUE_PREFIX) {
            return SqliteUniqueConstraintParser.parse(error);
        }

        if message.starts_with(CHECK_PREFIX) {
            return SqliteCheckParser.parse(error);
        }

        Err(IntegrityParseError::PatternNotFound {
            vendor: Vendor::Sqlite,
            kind: None,
        })
    }
}
