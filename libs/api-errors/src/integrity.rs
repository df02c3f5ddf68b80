//! Integrity violations → resource errors.

use db_integrity::{parse, IntegrityParseError, IntegrityViolationKind, ParseResult, RawIntegrityError};
use serde_json::Value;

use crate::error::ApiError;
use crate::field_value::{FieldValue, Fields};
use crate::resource::ResourceErrors;

/// Build the API error for a classified violation.
///
/// Unique and not-null violations echo `payload[column]` for every reported
/// column, in driver order; a column absent from the payload is `null`.
/// Check violations carry the constraint name.
///
/// `result` is expected to come from [`db_integrity::parse`], whose results
/// always hold at least one column. A hand-built check result with no
/// columns maps to an empty constraint name.
pub fn map_violation(errors: &ResourceErrors, result: &ParseResult, payload: &Value) -> ApiError {
    match result.kind {
        IntegrityViolationKind::UniqueConstraint => {
            errors.unique_constraint(payload_fields(&result.columns, payload))
        }
        IntegrityViolationKind::NotNullConstraint => {
            errors.not_null_constraint(payload_fields(&result.columns, payload))
        }
        IntegrityViolationKind::CheckConstraint => {
            errors.check_constraint(result.columns.first().cloned().unwrap_or_default())
        }
    }
}

/// Classify a raw integrity error and map it. Classification failures are
/// returned unchanged so the caller can surface the original database error.
pub fn handle_integrity_error(
    errors: &ResourceErrors,
    error: &RawIntegrityError,
    payload: &Value,
) -> Result<ApiError, IntegrityParseError> {
    let result = parse(error).inspect_err(|e| {
        tracing::warn!(resource = %errors.resource, error = %e, "unclassified integrity error");
    })?;
    Ok(map_violation(errors, &result, payload))
}

fn payload_fields(columns: &[String], payload: &Value) -> Fields {
    columns
        .iter()
        .map(|column| {
            let value = payload
                .get(column)
                .map_or(FieldValue::Null, FieldValue::from_json);
            (column.clone(), value)
        })
        .collect()
}
