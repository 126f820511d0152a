//! Integration tests for valida-validation crate
//!
//! These tests verify end-to-end validation scenarios with hand-assembled
//! validator trees.

use serde_json::json;
use std::borrow::Cow;
use std::sync::Arc;
use valida_validation::{
    Additional, AdaptTo, AnyOf, Condition, Enum, Error, ErrorFormat, HeterogeneousSequence,
    HomogeneousSequence, Mapping, NonNullable, Nullable, Object, PathSegment, Pattern, Range,
    Text, Type, TypeClass, ValidationReporter, Validator, ValidatorRef,
};
use valida_value::{Value, ValueKind};

fn prop(name: &str, validator: impl Validator + 'static) -> (String, ValidatorRef) {
    (name.to_string(), Arc::new(validator))
}

/// A record shaped like `{"foo": 3, "bar": [1, 2, 3], ...}`
fn record_validator() -> Object {
    Object::new(
        [
            prop(
                "bar",
                HomogeneousSequence::new(Some(Arc::new(Type::integer()))).min_length(1),
            ),
            prop("label", Nullable::new(Arc::new(Text::new().max_length(8)))),
            prop(
                "level",
                Nullable::new(Arc::new(Range::new(Some(Arc::new(Type::integer()))).min(1).max(5)))
                    .with_default(Value::Integer(1)),
            ),
            prop("code", Pattern::new(r"[A-Z]{2}\d+").unwrap()),
            prop("kind", Enum::new(["a", "b"])),
            prop(
                "point",
                HeterogeneousSequence::new([
                    Arc::new(Type::number()) as ValidatorRef,
                    Arc::new(Type::number()) as ValidatorRef,
                ]),
            ),
            prop(
                "tags",
                Mapping::new(Some(Arc::new(Text::new())), Some(Arc::new(Type::boolean()))),
            ),
        ],
        [prop("foo", NonNullable::new(Some(Arc::new(Type::number()))))],
        Additional::Deny,
    )
}

#[test]
fn test_valid_record_adapts_with_defaults() {
    let validator = record_validator();
    let value = Value::from(json!({
        "foo": 3,
        "bar": [1, 2, 3],
        "code": "AB12",
        "kind": "a",
        "point": [1.5, 2],
        "tags": {"x": true}
    }));

    assert!(validator.is_valid(&value));
    let adapted = validator.adapt(&value).unwrap();
    let map = adapted.as_map().unwrap();
    assert_eq!(map.get_str("level"), Some(&Value::Integer(1)));
    assert!(!map.contains_str("label"));
}

#[test]
fn test_first_error_has_context_path() {
    let validator = record_validator();
    let value = Value::from(json!({"foo": 3, "bar": [1, "2", 3]}));

    let err = validator.validate(&value, true).unwrap_err();
    let first = &err.errors()[0];
    assert_eq!(
        first.path(),
        vec![&PathSegment::from("bar"), &PathSegment::Index(1)]
    );
    assert_eq!(first.value(), Some(&Value::from("2")));
    assert_eq!(
        err.to_string(),
        r#"Invalid value "2" (string): must be integer (at bar[1])"#
    );
}

#[test]
fn test_full_validation_collects_everything() {
    let validator = record_validator();
    let value = Value::from(json!({
        "bar": [],
        "label": "far too long",
        "level": 9,
        "code": "ab12",
        "kind": "c",
        "point": [1],
        "tags": {"x": "yes"},
        "unexpected": 1
    }));

    let err = validator.full_validate(&value, false).unwrap_err();
    assert!(matches!(err, Error::Aggregate(_)));
    let messages: Vec<&str> = err.errors().iter().map(|e| e.message()).collect();
    assert_eq!(
        messages,
        vec![
            r#"missing required properties: ["foo"]"#,
            "must contain at least 1 elements",
            "must be at most 8 characters long",
            "must not be larger than 5",
            r"must match pattern [A-Z]{2}\d+",
            r#"must be one of {"a", "b"}"#,
            "2 items expected, 1 found",
            "must be boolean",
            r#"additional properties: ["unexpected"]"#,
        ]
    );
    assert_eq!(err.errors()[7].path(), vec![&PathSegment::from("tags"), &PathSegment::from("x")]);
    assert!(err.to_string().starts_with("\n- "));
}

#[test]
fn test_non_nullable_required_property() {
    let validator = record_validator();
    let err = validator
        .validate(&Value::from(json!({"foo": null})), false)
        .unwrap_err();
    assert_eq!(err.errors()[0].message(), "must be number");
    assert_eq!(err.errors()[0].path(), vec![&PathSegment::from("foo")]);
}

#[test]
fn test_check_only_never_copies() {
    let validator = record_validator();
    let value = Value::from(json!({"foo": 3}));
    assert!(matches!(validator.validate(&value, false), Ok(Cow::Borrowed(_))));
    assert!(matches!(validator.validate(&value, true), Ok(Cow::Owned(_))));
}

#[test]
fn test_adaptation_is_idempotent() {
    let validator = HomogeneousSequence::new(Some(Arc::new(AnyOf::new([
        Arc::new(AdaptTo::new(TypeClass::Integral)) as ValidatorRef,
        Arc::new(Text::new()) as ValidatorRef,
    ]))));
    let value = Value::from(json!(["1", 2.7, "x", true]));

    let once = validator.adapt(&value).unwrap();
    let twice = validator.adapt(&once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        once,
        Value::List(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::from("x"),
            Value::Bool(true)
        ])
    );
}

#[test]
fn test_custom_error_format() {
    let even: ValidatorRef = Arc::new(Condition::new("is_even", |v| {
        v.as_i64().is_some_and(|i| i % 2 == 0)
    }));
    let validator = Mapping::new(None, Some(even));
    let err = validator
        .validate(&Value::from(json!({"n": [3]})), false)
        .unwrap_err();

    let format = ErrorFormat::json().with_type_name("sequence", [ValueKind::List, ValueKind::Tuple]);
    assert_eq!(
        err.render(&format),
        "Invalid value [3] (sequence): must satisfy predicate is_even (at n)"
    );
}

#[test]
fn test_reporter_round_trip_to_json() {
    let report = ValidationReporter::new().check(
        &record_validator(),
        &Value::from(json!({"foo": "3", "bar": [1]})),
    );
    assert!(!report.is_valid);
    assert_eq!(report.issue_count(), 1);
    assert_eq!(report.issues[0].path, vec![json!("foo")]);
    assert_eq!(report.issues[0].value, Some(json!("3")));
}
