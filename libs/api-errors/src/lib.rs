//! Typed API errors rendered as RFC 9457 Problem Details.
//!
//! [`ApiError`] covers integrity violations, lookups, auth and per-operation
//! validation. Each maps to a static [`ErrDef`] catalog entry and renders to a
//! [`Problem`]; [`ProblemResponse`] turns that into an axum response.

pub mod catalog;
pub mod error;
pub mod field_value;
pub mod integrity;
pub mod problem;
pub mod resource;
pub mod text;
pub mod validation;

pub use catalog::{ErrDef, DEFAULT_TYPE_PREFIX};
pub use error::{ApiError, ApiResult};
pub use field_value::{FieldValue, Fields};
pub use integrity::{handle_integrity_error, map_violation};
pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use resource::ResourceErrors;
pub use validation::{LocItem, ValidationErrorDetail};
