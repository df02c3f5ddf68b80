//! PostgreSQL integrity error messages.
//!
//! The driver text looks like
//! `duplicate key value violates unique constraint "name"\nDETAIL:  Key (a, b)=(1, 2) already exists.\n`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::IntegrityParseError;
use crate::parser::{captures, group, split_columns, IntegrityParser};
use crate::types::{IntegrityViolationKind, ParseResult, RawIntegrityError, Vendor};

const UNIQUE_PREFIX: &str = "duplicate key value violates unique constraint";
const NOT_NULL_PREFIX: &str = "null value in column";
const CHECK_MARKER: &str = "violates check constraint";

static UNIQUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^duplicate key value violates unique constraint "(?P<constraint_name>.*)"\nDETAIL:\s*Key \((?P<columns_string>.*)\)=\((?P<values_string>.*)\) already exists.\n?"#,
    )
    .expect("valid postgres unique pattern")
});

static NOT_NULL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^null value in column "(?P<column_string>.*)" of relation "(?P<relation_name>.*)" violates not-null constraint\nDETAIL:\s*Failing row contains \((?P<values_string>.*)\).\n?"#,
    )
    .expect("valid postgres not-null pattern")
});

static CHECK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^new row for relation "(?P<relation_name>.*)" violates check constraint "(?P<constraint_name>.*)"\nDETAIL:\s*Failing row contains \((?P<values_string>.*)\).\n?"#,
    )
    .expect("valid postgres check pattern")
});

/// `duplicate key value violates unique constraint ...`
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresUniqueConstraintParser;

impl IntegrityParser for PostgresUniqueConstraintParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::UniqueConstraint;

        let message = error.message()?;
        let caps = captures(&UNIQUE_PATTERN, message, Vendor::Postgres, KIND)?;
        let columns_string = group(&caps, "columns_string", Vendor::Postgres, KIND)?;
        let columns = split_columns(columns_string, Vendor::Postgres, KIND)?;

        Ok(ParseResult::new(
            KIND,
            columns.into_iter().map(str::to_owned).collect(),
        ))
    }
}

/// `null value in column "..." of relation "..." violates not-null constraint`
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresNotNullParser;

impl IntegrityParser for PostgresNotNullParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::NotNullConstraint;

        let message = error.message()?;
        let caps = captures(&NOT_NULL_PATTERN, message, Vendor::Postgres, KIND)?;
        let column = group(&caps, "column_string", Vendor::Postgres, KIND)?;
        if column.is_empty() {
            return Err(IntegrityParseError::no_columns(Vendor::Postgres, KIND));
        }

        Ok(ParseResult::new(KIND, vec![column.to_owned()]))
    }
}

/// `new row for relation "..." violates check constraint "..."`
///
/// Reports the constraint name, not a column.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresCheckParser;

impl IntegrityParser for PostgresCheckParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        const KIND: IntegrityViolationKind = IntegrityViolationKind::CheckConstraint;

        let message = error.message()?;
        let caps = captures(&CHECK_PATTERN, message, Vendor::Postgres, KIND)?;
        let constraint_name = group(&caps, "constraint_name", Vendor::Postgres, KIND)?;
        if constraint_name.is_empty() {
            return Err(IntegrityParseError::no_columns(Vendor::Postgres, KIND));
        }

        Ok(ParseResult::new(KIND, vec![constraint_name.to_owned()]))
    }
}

/// Routes a PostgreSQL message to the matching sub-parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresParser;

impl PostgresParser {
    pub(crate) fn recognizes(message: &str) -> bool {
        message.starts_with(NOT_NULL_PREFIX)
            || message.starts_with(UNIQUE_PREFIX)
            || message.contains(CHECK_MARKER)
    }
}

impl IntegrityParser for PostgresParser {
    fn parse(&self, error: &RawIntegrityError) -> Result<ParseResult, IntegrityParseError> {
        let message = error.message()?;

        if message.starts_with(NOT_NULL_PREFIX) {
            return PostgresNotNullParser.parse(error);
        }

        if message.starts_with(UNIQUE_PREFIX) {
            return PostgresUniqueConstraintParser.parse(error);
        }

        if message.contains(CHECK_MARKER) {
            return PostgresCheckParser.parse(error);
        }

        Err(IntegrityParseError::PatternNotFound {
            vendor: Vendor::Postgres,
            kind: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(message: &str) -> RawIntegrityError {
        RawIntegrityError::from_vendor(Vendor::Postgres, message)
    }

    #[test]
    fn unique_single_column() {
        let err = raw("duplicate key value violates unique constraint \"api_resource_value_unique_key\"\nDETAIL:  Key (value_unique)=(value) already exists.\n");

        assert_eq!(
            PostgresUniqueConstraintParser.parse(&err).unwrap(),
            ParseResult::new(
                IntegrityViolationKind::UniqueConstraint,
                vec!["value_unique".into()]
            )
        );
        assert_eq!(
            PostgresParser.parse(&err),
            PostgresUniqueConstraintParser.parse(&err)
        );
    }

    #[test]
    fn unique_composite_keeps_driver_order() {
        let err = raw("duplicate key value violates unique constraint \"unique_together\"\nDETAIL:  Key (value_unique_together_1, value_unique_together_2)=(value, value) already exists.\n");

        let result = PostgresParser.parse(&err).unwrap();
        assert_eq!(result.kind, IntegrityViolationKind::UniqueConstraint);
        assert_eq!(
            result.columns,
            vec!["value_unique_together_1", "value_unique_together_2"]
        );
    }

    #[test]
    fn not_null_column() {
        let err = raw("null value in column \"value_not_null\" of relation \"resource\" violates not-null constraint\nDETAIL:  Failing row contains (1, value, value, value, null).\n");

        assert_eq!(
            PostgresParser.parse(&err).unwrap(),
            ParseResult::new(
                IntegrityViolationKind::NotNullConstraint,
                vec!["value_not_null".into()]
            )
        );
    }

    #[test]
    fn check_reports_constraint_name() {
        let err = raw("new row for relation \"resource\" violates check constraint \"value_check_gte_0\"\nDETAIL:  Failing row contains (1, value, value, value, value, -1).\n");

        assert_eq!(
            PostgresParser.parse(&err).unwrap(),
            ParseResult::new(
                IntegrityViolationKind::CheckConstraint,
                vec!["value_check_gte_0".into()]
            )
        );
    }

    #[test]
    fn trailing_newline_is_optional() {
        let err = raw("duplicate key value violates unique constraint \"k\"\nDETAIL:  Key (email)=(a@b.c) already exists.");
        assert_eq!(
            PostgresParser.parse(&err).unwrap().columns,
            vec!["email".to_string()]
        );
    }

    #[test]
    fn missing_detail_is_pattern_not_found() {
        let err = raw("duplicate key value violates unique constraint \"k\"");
        assert_eq!(
            PostgresParser.parse(&err),
            Err(IntegrityParseError::PatternNotFound {
                vendor: Vendor::Postgres,
                kind: Some(IntegrityViolationKind::UniqueConstraint),
            })
        );
    }

    #[test]
    fn sub_parser_rejects_other_shapes() {
        let err = raw("null value in column \"x\" of relation \"r\" violates not-null constraint\nDETAIL:  Failing row contains (null).\n");
        assert!(matches!(
            PostgresUniqueConstraintParser.parse(&err),
            Err(IntegrityParseError::PatternNotFound { .. })
        ));
    }

    #[test]
    fn empty_key_list_is_no_columns() {
        let err = raw("duplicate key value violates unique constraint \"k\"\nDETAIL:  Key ()=() already exists.\n");
        assert_eq!(
            PostgresParser.parse(&err),
            Err(IntegrityParseError::NoColumnsDetected {
                vendor: Vendor::Postgres,
                kind: IntegrityViolationKind::UniqueConstraint,
            })
        );
    }

    #[test]
    fn unrelated_message_is_pattern_not_found() {
        let err = raw("insert or update on table \"child\" violates foreign key constraint \"fk\"");
        assert_eq!(
            PostgresParser.parse(&err),
            Err(IntegrityParseError::PatternNotFound {
                vendor: Vendor::Postgres,
                kind: None,
            })
        );
    }

    #[test]
    fn multiple_args_fail_before_matching() {
        let err = RawIntegrityError::with_args(["a", "b"]).with_vendor(Vendor::Postgres);
        assert_eq!(
            PostgresCheckParser.parse(&err),
            Err(IntegrityParseError::MultipleArgs { count: 2 })
        );
    }
}
