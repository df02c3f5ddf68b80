use api_errors::{
    catalog, handle_integrity_error, ApiError, ProblemResponse, ResourceErrors,
    APPLICATION_PROBLEM_JSON,
};
use axum::response::IntoResponse;
use db_integrity::{RawIntegrityError, Vendor};
use serde_json::json;

const PG_UNIQUE: &str = "duplicate key value violates unique constraint \"api_resource_value_unique_key\"\nDETAIL:  Key (value_unique)=(value) already exists.\n";

#[test]
fn postgres_unique_violation_becomes_problem() {
    let errors = ResourceErrors::new("resource");
    let payload = json!({"value_unique": "value", "value_not_null": "x"});

    let err = handle_integrity_error(
        &errors,
        &RawIntegrityError::from_vendor(Vendor::Postgres, PG_UNIQUE),
        &payload,
    )
    .unwrap();

    let problem = err.to_problem("/api/resources", Some("create_resource"));
    assert_eq!(
        serde_json::to_value(&problem).unwrap(),
        json!({
            "type": "errors/unique-constraint",
            "title": "Unique constraint violated",
            "status": 422,
            "detail": "resource with value_unique='value' already exists.",
            "instance": "/api/resources",
            "code": "unique_constraint",
            "operation_id": "create_resource",
            "resource": "resource",
            "fields": {"value_unique": "value"},
        })
    );
}

#[test]
fn sqlite_not_null_violation_becomes_problem() {
    let err = handle_integrity_error(
        &ResourceErrors::new("resource"),
        &RawIntegrityError::new("NOT NULL constraint failed: resource.value_not_null"),
        &json!({"value_not_null": null}),
    )
    .unwrap();

    assert_eq!(err.status(), 422);
    assert_eq!(err.type_path(), "errors/not-null-constraint");
    assert_eq!(
        err.to_problem("/", None).fields.unwrap()["value_not_null"],
        api_errors::FieldValue::Null
    );
}

#[test]
fn every_catalog_entry_has_a_client_error_status() {
    for def in catalog::ALL {
        assert!((400..500).contains(&def.status), "{def:?}");
        assert_eq!(def.to_problem("d").status, def.status);
    }
}

#[test]
fn authorization_lists_permissions() {
    let err = ApiError::Authorization {
        permissions: vec!["resource.add".into(), "resource.change".into()],
    };
    let problem = err.to_problem("/api/resources/1", None);
    assert_eq!(problem.status, 403);
    assert_eq!(
        problem.permissions,
        Some(vec!["resource.add".to_string(), "resource.change".to_string()])
    );
    assert_eq!(problem.detail, "Missing permissions: resource.add, resource.change.");
}

#[tokio::test]
async fn response_body_is_problem_json() {
    let resp = ProblemResponse::from(ApiError::Authentication).into_response();
    assert_eq!(resp.status(), axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some(APPLICATION_PROBLEM_JSON)
    );

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["type"], "errors/authentication");
    assert_eq!(body["instance"], "/");
    assert!(body.get("fields").is_none());
}
