use std::cmp::Ordering;

use crate::{all_tokens, sortable_fields, Error, SortDir, SortKey, SortSchema, SortableField};

sortable_fields! {
    enum ResourceSort {
        Name = "name" => "name",
        Created = "created" => "created_at",
        Value = "value" => "value_check",
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    name: &'static str,
    created_at: u32,
    value_check: i64,
}

fn rows() -> Vec<Row> {
    vec![
        Row { name: "b", created_at: 2, value_check: 10 },
        Row { name: "a", created_at: 3, value_check: 10 },
        Row { name: "c", created_at: 1, value_check: 5 },
        Row { name: "a", created_at: 1, value_check: 7 },
    ]
}

fn compare(field: ResourceSort, a: &Row, b: &Row) -> Ordering {
    match field {
        ResourceSort::Name => a.name.cmp(b.name),
        ResourceSort::Created => a.created_at.cmp(&b.created_at),
        ResourceSort::Value => a.value_check.cmp(&b.value_check),
    }
}

#[test]
fn every_field_yields_two_tokens() {
    assert_eq!(
        all_tokens::<ResourceSort>(),
        vec![
            "name_asc",
            "name_desc",
            "created_asc",
            "created_desc",
            "value_asc",
            "value_desc",
        ]
    );
}

#[test]
fn token_round_trips_through_display() {
    let key: SortKey<ResourceSort> = "created_desc".parse().unwrap();
    assert_eq!(key.field, ResourceSort::Created);
    assert_eq!(key.dir, SortDir::Desc);
    assert_eq!(key.to_string(), "created_desc");
    assert_eq!(key.field_expr(), "-created_at");
}

#[test]
fn unknown_tokens_are_rejected() {
    for token in ["created", "created_at_asc", "nope_desc", "NAME_ASC", ""] {
        assert_eq!(
            token.parse::<SortKey<ResourceSort>>(),
            Err(Error::InvalidSortKey(token.to_string())),
            "{token:?}"
        );
    }
}

#[test]
fn schema_maps_tokens_to_fields() {
    let schema = SortSchema::<ResourceSort>::parse("name_asc, created_desc").unwrap();
    assert_eq!(schema.tokens(), vec!["name_asc", "created_desc"]);
    assert_eq!(schema.fields(), vec!["name", "-created_at"]);
    assert_eq!(
        schema.order_by_sql().as_deref(),
        Some(r#""name" ASC, "created_at" DESC"#)
    );
}

#[test]
fn blank_ordering_is_none() {
    let schema = SortSchema::<ResourceSort>::parse("  ").unwrap();
    assert_eq!(schema, SortSchema::default());
    assert!(schema.fields().is_empty());
    assert_eq!(schema.order_by_sql(), None);
}

#[test]
fn a_field_may_appear_once() {
    assert_eq!(
        SortSchema::<ResourceSort>::parse("name_asc,name_desc"),
        Err(Error::DuplicateSortField("name".into()))
    );
    assert_eq!(
        SortSchema::new(vec![
            SortKey::asc(ResourceSort::Value),
            SortKey::asc(ResourceSort::Value),
        ]),
        Err(Error::DuplicateSortField("value".into()))
    );
}

#[test]
fn sort_slice_applies_keys_in_order() {
    let schema = SortSchema::new(vec![
        SortKey::asc(ResourceSort::Name),
        SortKey::desc(ResourceSort::Created),
    ])
    .unwrap();

    let mut items = rows();
    schema.sort_slice(&mut items, compare);
    let order: Vec<_> = items.iter().map(|r| (r.name, r.created_at)).collect();
    assert_eq!(order, vec![("a", 3), ("a", 1), ("b", 2), ("c", 1)]);
}

#[test]
fn sort_slice_is_stable_and_noop_without_ordering() {
    let mut items = rows();
    SortSchema::<ResourceSort>::default().sort_slice(&mut items, compare);
    assert_eq!(items, rows());

    let schema = SortSchema::new(vec![SortKey::desc(ResourceSort::Value)]).unwrap();
    let mut items = rows();
    schema.sort_slice(&mut items, compare);
    let names: Vec<_> = items.iter().map(|r| r.name).collect();
    // "b" and "a" tie on value 10 and keep their input order.
    assert_eq!(names, vec!["b", "a", "a", "c"]);
}

#[test]
fn schema_deserializes_from_query_json() {
    let schema: SortSchema<ResourceSort> =
        serde_json::from_str(r#"{"ordering": ["value_desc", "name_asc"]}"#).unwrap();
    assert_eq!(schema.fields(), vec!["-value_check", "name"]);

    let err = serde_json::from_str::<SortSchema<ResourceSort>>(r#"{"ordering": ["bogus"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("invalid sort key: bogus"));

    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json, serde_json::json!({"ordering": ["value_desc", "name_asc"]}));
}

#[test]
fn declared_columns_are_exposed() {
    let columns: Vec<_> = ResourceSort::ALL.iter().map(|f| f.column()).collect();
    assert_eq!(columns, vec!["name", "created_at", "value_check"]);
}
