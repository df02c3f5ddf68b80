//! Driver error-code categorization (SQLSTATE and SQLite extended result codes).

use crate::types::IntegrityViolationKind;

/// Map a driver error code to the integrity violation it denotes.
///
/// Postgres SQLSTATE: 23505 unique, 23502 not-null, 23514 check.
/// SQLite extended codes: 2067 unique, 1555 primary key, 1299 not-null, 275 check.
pub fn kind_from_code(code: &str) -> Option<IntegrityViolationKind> {
    match code {
        "23505" | "2067" | "1555" => Some(IntegrityViolationKind::UniqueConstraint),
        "23502" | "1299" => Some(IntegrityViolationKind::NotNullConstraint),
        "23514" | "275" => Some(IntegrityViolationKind::CheckConstraint),
        _ => None,
    }
}

/// Returns true if the given code represents a unique constraint violation
/// across supported backends (Postgres 23505, SQLite 2067/1555).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(
        kind_from_code(code),
        Some(IntegrityViolationKind::UniqueConstraint)
    )
}

/// Returns true for any code the classifier knows how to parse.
pub fn is_integrity_violation_code(code: &str) -> bool {
    kind_from_code(code).is_some()
}
