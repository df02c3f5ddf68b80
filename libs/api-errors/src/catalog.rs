//! Static catalog of API error definitions.
use axum::http::StatusCode;

use crate::problem::Problem;

/// Prefix of every catalog `type` path.
pub const DEFAULT_TYPE_PREFIX: &str = "errors/";

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_path: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_path)
    }
}

pub const UNIQUE_CONSTRAINT: ErrDef = ErrDef {
    status: 422,
    title: "Unique constraint violated",
    code: "unique_constraint",
    type_path: "errors/unique-constraint",
};

pub const NOT_NULL_CONSTRAINT: ErrDef = ErrDef {
    status: 422,
    title: "Not-null constraint violated",
    code: "not_null_constraint",
    type_path: "errors/not-null-constraint",
};

pub const CHECK_CONSTRAINT: ErrDef = ErrDef {
    status: 422,
    title: "Check constraint violated",
    code: "check_constraint",
    type_path: "errors/check-constraint",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not found",
    code: "not_found",
    type_path: "errors/not-found",
};

pub const MULTIPLE_OBJECTS_RETURNED: ErrDef = ErrDef {
    status: 422,
    title: "Multiple objects returned",
    code: "multiple_objects_returned",
    type_path: "errors/multiple-objects-returned",
};

pub const PROTECTED: ErrDef = ErrDef {
    status: 422,
    title: "Protected",
    code: "protected",
    type_path: "errors/protection",
};

pub const AUTHENTICATION: ErrDef = ErrDef {
    status: 401,
    title: "Authentication failed",
    code: "authentication",
    type_path: "errors/authentication",
};

pub const AUTHORIZATION: ErrDef = ErrDef {
    status: 403,
    title: "Authorization failed",
    code: "authorization",
    type_path: "errors/authorization",
};

pub const CSRF: ErrDef = ErrDef {
    status: 403,
    title: "CSRF verification failed",
    code: "csrf",
    type_path: "errors/csrf",
};

/// Every fixed entry. Validation types are derived per operation.
pub const ALL: &[ErrDef] = &[
    UNIQUE_CONSTRAINT,
    NOT_NULL_CONSTRAINT,
    CHECK_CONSTRAINT,
    NOT_FOUND,
    MULTIPLE_OBJECTS_RETURNED,
    PROTECTED,
    AUTHENTICATION,
    AUTHORIZATION,
    CSRF,
];

pub const VALIDATION_STATUS: u16 = 422;
pub const VALIDATION_CODE: &str = "validation";
