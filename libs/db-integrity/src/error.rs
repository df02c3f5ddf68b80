use thiserror::Error;

use crate::types::{IntegrityViolationKind, Vendor};

/// Reasons an integrity error could not be classified.
///
/// All variants are fatal for the parse call. Callers should surface the
/// original database error instead of masking it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityParseError {
    #[error("Unable to parse Integrity Error. IntegrityError was instantiated with {count} args, expected exactly one.")]
    MultipleArgs { count: usize },

    #[error("Unable to parse Integrity Error. Pattern not found ({vendor}{}).", kind_suffix(.kind))]
    PatternNotFound {
        vendor: Vendor,
        kind: Option<IntegrityViolationKind>,
    },

    #[error("Unable to parse Integrity Error. No columns detected ({vendor}, {kind}).")]
    NoColumnsDetected {
        vendor: Vendor,
        kind: IntegrityViolationKind,
    },

    #[error("Unable to parse Integrity Error. Column not parsable: '{column}'.")]
    ColumnNotParsable { column: String },

    #[error("Unable to parse Integrity Error. Unknown database vendor.")]
    UnknownVendor,
}

fn kind_suffix(kind: &Option<IntegrityViolationKind>) -> String {
    kind.map(|k| format!(", {k}")).unwrap_or_default()
}

impl IntegrityParseError {
    pub(crate) fn pattern_not_found(vendor: Vendor, kind: IntegrityViolationKind) -> Self {
        Self::PatternNotFound {
            vendor,
            kind: Some(kind),
        }
    }

    pub(crate) fn no_columns(vendor: Vendor, kind: IntegrityViolationKind) -> Self {
        Self::NoColumnsDetected { vendor, kind }
    }
}
