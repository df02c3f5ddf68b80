use std::fmt;

use axum::response::IntoResponse;
use indexmap::IndexMap;

use crate::catalog::{self, ErrDef};
use crate::field_value::{fields_detail, Fields};
use crate::problem::{Problem, ProblemResponse};
use crate::text::snake_to_kebab;
use crate::validation::ValidationErrorDetail;

/// Errors an API operation reports to its caller.
///
/// Each variant maps to one catalog entry; [`ApiError::to_problem`] renders it
/// as RFC 9457 Problem Details with the variant's extension members.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    UniqueConstraint { resource: String, fields: Fields },
    NotNullConstraint { resource: String, fields: Fields },
    CheckConstraint { resource: String, constraint: String },
    NotFound { resource: String, fields: Fields },
    MultipleObjectsReturned { resource: String, fields: Fields },
    /// Deletion blocked by referencing rows; ids sorted per referencing model.
    Protected {
        resource: String,
        foreign_items: IndexMap<String, Vec<i64>>,
    },
    Authentication,
    Authorization { permissions: Vec<String> },
    Csrf,
    Validation {
        router_prefix: Option<String>,
        operation_id: String,
        errors: Vec<ValidationErrorDetail>,
    },
}

impl ApiError {
    /// Validation failure of one operation's input.
    pub fn validation(
        router_prefix: Option<&str>,
        operation_id: impl Into<String>,
        errors: Vec<ValidationErrorDetail>,
    ) -> Self {
        ApiError::Validation {
            router_prefix: router_prefix.map(str::to_owned),
            operation_id: operation_id.into(),
            errors,
        }
    }

    /// Paging or sorting input rejected for an operation.
    pub fn from_paging(
        router_prefix: Option<&str>,
        operation_id: impl Into<String>,
        err: &paging_core::Error,
    ) -> Self {
        Self::validation(router_prefix, operation_id, vec![err.into()])
    }

    /// Catalog entry; `None` for validation, whose type is per operation.
    pub fn def(&self) -> Option<&'static ErrDef> {
        Some(match self {
            ApiError::UniqueConstraint { .. } => &catalog::UNIQUE_CONSTRAINT,
            ApiError::NotNullConstraint { .. } => &catalog::NOT_NULL_CONSTRAINT,
            ApiError::CheckConstraint { .. } => &catalog::CHECK_CONSTRAINT,
            ApiError::NotFound { .. } => &catalog::NOT_FOUND,
            ApiError::MultipleObjectsReturned { .. } => &catalog::MULTIPLE_OBJECTS_RETURNED,
            ApiError::Protected { .. } => &catalog::PROTECTED,
            ApiError::Authentication => &catalog::AUTHENTICATION,
            ApiError::Authorization { .. } => &catalog::AUTHORIZATION,
            ApiError::Csrf => &catalog::CSRF,
            ApiError::Validation { .. } => return None,
        })
    }

    pub fn status(&self) -> u16 {
        self.def().map_or(catalog::VALIDATION_STATUS, |d| d.status)
    }

    pub fn code(&self) -> &'static str {
        self.def().map_or(catalog::VALIDATION_CODE, |d| d.code)
    }

    /// `errors/...` type path; validation types are
    /// `errors/{router_prefix/}{operation-id}/validation`.
    pub fn type_path(&self) -> String {
        match self {
            ApiError::Validation {
                router_prefix,
                operation_id,
                ..
            } => {
                let op = snake_to_kebab(operation_id);
                match router_prefix {
                    Some(prefix) => format!(
                        "{}{prefix}/{op}/validation",
                        catalog::DEFAULT_TYPE_PREFIX
                    ),
                    None => format!("{}{op}/validation", catalog::DEFAULT_TYPE_PREFIX),
                }
            }
            other => other
                .def()
                .map(|d| d.type_path.to_owned())
                .unwrap_or_default(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ApiError::Validation { operation_id, .. } => {
                format!("Validation for operation {operation_id} failed.")
            }
            other => other.def().map(|d| d.title.to_owned()).unwrap_or_default(),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::UniqueConstraint { resource, fields } => format!(
                "{resource} with {} already exists.",
                fields_detail(fields)
            ),
            ApiError::NotNullConstraint { resource, fields } => format!(
                "{resource} requires non-null {}.",
                fields_detail(fields)
            ),
            ApiError::CheckConstraint {
                resource,
                constraint,
            } => format!("{resource} violates check constraint '{constraint}'."),
            ApiError::NotFound { resource, fields } => {
                format!("{resource} with {} not found.", fields_detail(fields))
            }
            ApiError::MultipleObjectsReturned { resource, fields } => format!(
                "Multiple {resource} objects returned for {}.",
                fields_detail(fields)
            ),
            ApiError::Protected {
                resource,
                foreign_items,
            } => {
                let refs = foreign_items
                    .iter()
                    .map(|(model, ids)| format!("{model} {ids:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{resource} is referenced by {refs}.")
            }
            ApiError::Authentication => {
                "Authentication credentials were not provided or are invalid.".to_string()
            }
            ApiError::Authorization { permissions } => {
                format!("Missing permissions: {}.", permissions.join(", "))
            }
            ApiError::Csrf => "CSRF verification failed.".to_string(),
            ApiError::Validation { operation_id, .. } => {
                format!("Validation for operation {operation_id} failed.")
            }
        }
    }

    /// Render as Problem Details for the request at `instance`.
    pub fn to_problem(&self, instance: &str, operation_id: Option<&str>) -> Problem {
        let mut problem = Problem::new(
            axum::http::StatusCode::from_u16(self.status())
                .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
            self.title(),
            self.detail(),
        )
        .with_type(self.type_path())
        .with_code(self.code())
        .with_instance(instance);

        if let Some(op) = operation_id {
            problem = problem.with_operation_id(op);
        }

        match self {
            ApiError::UniqueConstraint { resource, fields }
            | ApiError::NotNullConstraint { resource, fields }
            | ApiError::NotFound { resource, fields }
            | ApiError::MultipleObjectsReturned { resource, fields } => problem
                .with_resource(resource.clone())
                .with_fields(fields.clone()),
            ApiError::CheckConstraint {
                resource,
                constraint,
            } => problem
                .with_resource(resource.clone())
                .with_constraint(constraint.clone()),
            ApiError::Protected {
                resource,
                foreign_items,
            } => problem
                .with_resource(resource.clone())
                .with_foreign_items(foreign_items.clone()),
            ApiError::Authorization { permissions } => {
                problem.with_permissions(permissions.clone())
            }
            ApiError::Validation { errors, .. } => problem.with_errors(errors.clone()),
            ApiError::Authentication | ApiError::Csrf => problem,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

impl std::error::Error for ApiError {}

impl From<ApiError> for ProblemResponse {
    fn from(e: ApiError) -> Self {
        ProblemResponse(e.to_problem("/", None))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // No request context here; handlers that know the path use `to_problem`.
        ProblemResponse::from(self).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_value::FieldValue;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn statuses_follow_the_catalog() {
        let cases = [
            (
                ApiError::UniqueConstraint {
                    resource: "resource".into(),
                    fields: Fields::new(),
                },
                422,
            ),
            (
                ApiError::NotFound {
                    resource: "resource".into(),
                    fields: Fields::new(),
                },
                404,
            ),
            (ApiError::Authentication, 401),
            (
                ApiError::Authorization {
                    permissions: vec![],
                },
                403,
            ),
            (ApiError::Csrf, 403),
            (ApiError::validation(None, "create_resource", vec![]), 422),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err:?}");
        }
    }

    #[test]
    fn validation_type_includes_router_prefix() {
        let err = ApiError::validation(Some("resources"), "create_resource", vec![]);
        assert_eq!(
            err.type_path(),
            "errors/resources/create-resource/validation"
        );
        assert_eq!(err.title(), "Validation for operation create_resource failed.");
        assert_eq!(err.def(), None);

        let err = ApiError::validation(None, "create_resource", vec![]);
        assert_eq!(err.type_path(), "errors/create-resource/validation");
    }

    #[test]
    fn unique_detail_lists_fields_in_order() {
        let err = ApiError::UniqueConstraint {
            resource: "resource".into(),
            fields: fields(&[
                ("value_unique_together_1", FieldValue::from("a")),
                ("value_unique_together_2", FieldValue::Int(2)),
            ]),
        };
        assert_eq!(
            err.to_string(),
            "resource with value_unique_together_1='a', value_unique_together_2=2 already exists."
        );
    }

    #[test]
    fn problem_carries_extensions() {
        let err = ApiError::CheckConstraint {
            resource: "resource".into(),
            constraint: "value_check_gte_0".into(),
        };
        let p = err.to_problem("/api/resources", Some("create_resource"));
        assert_eq!(p.type_url, "errors/check-constraint");
        assert_eq!(p.status, 422);
        assert_eq!(p.code, "check_constraint");
        assert_eq!(p.instance, "/api/resources");
        assert_eq!(p.operation_id.as_deref(), Some("create_resource"));
        assert_eq!(p.resource.as_deref(), Some("resource"));
        assert_eq!(p.constraint.as_deref(), Some("value_check_gte_0"));
        assert_eq!(p.fields, None);
    }

    #[test]
    fn paging_errors_become_validation_problems() {
        let err = ApiError::from_paging(
            Some("resources"),
            "list_resources",
            &paging_core::Error::PageOutOfRange { page: 9, pages: 2 },
        );
        let p = err.to_problem("/api/resources", None);
        assert_eq!(p.status, 422);
        assert_eq!(p.type_url, "errors/resources/list-resources/validation");
        let errors = p.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, "less_than_equal");
    }

    #[test]
    fn into_response_uses_status() {
        let resp = ApiError::Csrf.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
