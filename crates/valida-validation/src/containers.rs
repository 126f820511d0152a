//! Sequence and mapping validators

use crate::engine::{Collector, Nullability, ValidationMode, Validator, ValidatorRef};
use crate::error::{PathSegment, ValidationError};
use crate::types::Type;
use crate::Result;
use std::borrow::Cow;
use tracing::trace;
use valida_value::{Map, Value};

fn rebuild_like(original: &Value, items: Vec<Value>) -> Value {
    match original {
        Value::Tuple(_) => Value::Tuple(items),
        _ => Value::List(items),
    }
}

/// Sequence whose items all satisfy one validator
#[derive(Debug, Clone)]
pub struct HomogeneousSequence {
    base: Type,
    item: Option<ValidatorRef>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl HomogeneousSequence {
    #[must_use]
    pub fn new(item: Option<ValidatorRef>) -> Self {
        Self {
            base: Type::sequence(),
            item,
            min_length: None,
            max_length: None,
        }
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

impl Validator for HomogeneousSequence {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let Some(items) = value.as_sequence() else {
            return Err(self.error(value).into());
        };
        if let Some(min) = self.min_length {
            if items.len() < min {
                let msg = format!("must contain at least {min} elements");
                return Err(ValidationError::invalid(msg, value).into());
            }
        }
        if let Some(max) = self.max_length {
            if items.len() > max {
                let msg = format!("must contain at most {max} elements");
                return Err(ValidationError::invalid(msg, value).into());
            }
        }
        let Some(item_validator) = &self.item else {
            return Ok(Cow::Borrowed(value));
        };

        let mut collector = Collector::new(mode);
        let mut adapted = Vec::with_capacity(if mode.adapt { items.len() } else { 0 });
        for (idx, item) in items.iter().enumerate() {
            let outcome = item_validator.check(item, mode);
            if let Some(result) = collector.record(outcome, Some(PathSegment::Index(idx)))? {
                if mode.adapt {
                    adapted.push(result.into_owned());
                }
            }
        }
        collector.finish()?;

        if mode.adapt {
            Ok(Cow::Owned(rebuild_like(value, adapted)))
        } else {
            Ok(Cow::Borrowed(value))
        }
    }

    fn humanized_name(&self) -> String {
        self.base.humanized_name()
    }
}

/// Fixed-length sequence with one validator per position
#[derive(Debug, Clone)]
pub struct HeterogeneousSequence {
    base: Type,
    items: Vec<ValidatorRef>,
}

impl HeterogeneousSequence {
    pub fn new(items: impl IntoIterator<Item = ValidatorRef>) -> Self {
        Self {
            base: Type::sequence(),
            items: items.into_iter().collect(),
        }
    }
}

impl Validator for HeterogeneousSequence {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let Some(items) = value.as_sequence() else {
            return Err(self.error(value).into());
        };
        if items.len() != self.items.len() {
            let msg = format!("{} items expected, {} found", self.items.len(), items.len());
            return Err(ValidationError::invalid(msg, value).into());
        }

        let mut collector = Collector::new(mode);
        let mut adapted = Vec::with_capacity(if mode.adapt { items.len() } else { 0 });
        for (idx, (validator, item)) in self.items.iter().zip(items).enumerate() {
            let outcome = validator.check(item, mode);
            if let Some(result) = collector.record(outcome, Some(PathSegment::Index(idx)))? {
                if mode.adapt {
                    adapted.push(result.into_owned());
                }
            }
        }
        collector.finish()?;

        if mode.adapt {
            Ok(Cow::Owned(rebuild_like(value, adapted)))
        } else {
            Ok(Cow::Borrowed(value))
        }
    }

    fn humanized_name(&self) -> String {
        self.base.humanized_name()
    }
}

/// Mapping whose keys and values each satisfy a validator
///
/// Values are checked before their key. A value failure is tagged with its
/// key; a key failure carries no context.
#[derive(Debug, Clone)]
pub struct Mapping {
    base: Type,
    key: Option<ValidatorRef>,
    value: Option<ValidatorRef>,
}

impl Mapping {
    #[must_use]
    pub fn new(key: Option<ValidatorRef>, value: Option<ValidatorRef>) -> Self {
        Self {
            base: Type::mapping(),
            key,
            value,
        }
    }
}

impl Validator for Mapping {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let Some(map) = value.as_map() else {
            return Err(self.error(value).into());
        };

        let mut collector = Collector::new(mode);
        let mut adapted = mode.adapt.then(|| Map::with_capacity(map.len()));
        for (key, item) in map.iter() {
            let new_item = match &self.value {
                Some(validator) => collector.record(
                    validator.check(item, mode),
                    Some(PathSegment::Key(key.clone())),
                )?,
                None => Some(Cow::Borrowed(item)),
            };
            let new_key = match &self.key {
                Some(validator) => collector.record(validator.check(key, mode), None)?,
                None => Some(Cow::Borrowed(key)),
            };
            if let (Some(out), Some(new_key), Some(new_item)) = (adapted.as_mut(), new_key, new_item) {
                out.insert(new_key.into_owned(), new_item.into_owned());
            }
        }
        collector.finish()?;

        Ok(match adapted {
            Some(out) => Cow::Owned(Value::Map(out)),
            None => Cow::Borrowed(value),
        })
    }

    fn humanized_name(&self) -> String {
        self.base.humanized_name()
    }
}

/// Policy for mapping keys an [`Object`] does not declare
#[derive(Debug, Clone, Default)]
pub enum Additional {
    /// Keep them as they are
    #[default]
    Allow,
    /// Reject the object
    Deny,
    /// Drop them from the adapted output
    Remove,
    /// Validate each of their values
    Schema(ValidatorRef),
}

/// Mapping with named, individually validated properties
#[derive(Debug, Clone)]
pub struct Object {
    base: Type,
    properties: Vec<(String, ValidatorRef)>,
    required: Vec<String>,
    additional: Additional,
}

impl Object {
    /// Declare optional and required properties
    ///
    /// A property declared in both sets is required, with the required
    /// validator taking precedence.
    pub fn new(
        optional: impl IntoIterator<Item = (String, ValidatorRef)>,
        required: impl IntoIterator<Item = (String, ValidatorRef)>,
        additional: Additional,
    ) -> Self {
        let mut properties: Vec<(String, ValidatorRef)> = optional.into_iter().collect();
        let mut required_names = Vec::new();
        for (name, validator) in required {
            match properties.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = validator,
                None => properties.push((name.clone(), validator)),
            }
            if !required_names.contains(&name) {
                required_names.push(name);
            }
        }
        Self {
            base: Type::mapping(),
            properties,
            required: required_names,
            additional,
        }
    }

    /// Declared property names with their validators, in declaration order
    #[must_use]
    pub fn properties(&self) -> &[(String, ValidatorRef)] {
        &self.properties
    }

    #[must_use]
    pub fn required_properties(&self) -> &[String] {
        &self.required
    }

    #[must_use]
    pub fn additional(&self) -> &Additional {
        &self.additional
    }

    fn is_declared(&self, key: &Value) -> bool {
        key.as_str()
            .is_some_and(|name| self.properties.iter().any(|(declared, _)| declared == name))
    }
}

impl Validator for Object {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let Some(map) = value.as_map() else {
            return Err(self.error(value).into());
        };
        let mut collector = Collector::new(mode);

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|name| !map.contains_str(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            let msg = format!("missing required properties: {missing:?}");
            collector.fail(ValidationError::invalid(msg, value).into(), None)?;
        }

        let mut adapted = mode.adapt.then(|| map.clone());
        for (name, validator) in &self.properties {
            match map.get_str(name) {
                Some(item) => {
                    let outcome = validator.check(item, mode);
                    let segment = Some(PathSegment::from(name.as_str()));
                    if let Some(result) = collector.record(outcome, segment)? {
                        if let Some(out) = adapted.as_mut() {
                            out.insert(name.as_str(), result.into_owned());
                        }
                    }
                }
                None => {
                    let Some(out) = adapted.as_mut() else { continue };
                    if let Some(Nullability::Nullable { default, .. }) = validator.nullability() {
                        let filled = default.resolve();
                        if !filled.is_null() {
                            out.insert(name.as_str(), filled);
                        }
                    }
                }
            }
        }

        if !matches!(self.additional, Additional::Allow) {
            let extra: Vec<&Value> = map.keys().filter(|key| !self.is_declared(key)).collect();
            if !extra.is_empty() {
                match &self.additional {
                    Additional::Deny => {
                        let listed = Value::List(extra.iter().map(|key| (*key).clone()).collect());
                        let msg = format!("additional properties: {listed}");
                        collector.fail(ValidationError::invalid(msg, value).into(), None)?;
                    }
                    Additional::Remove => {
                        if let Some(out) = adapted.as_mut() {
                            for key in &extra {
                                out.remove(key);
                            }
                            trace!(removed = extra.len(), "Dropped additional properties");
                        }
                    }
                    Additional::Schema(validator) => {
                        for key in extra {
                            let Some(item) = map.get(key) else { continue };
                            let outcome = validator.check(item, mode);
                            let segment = Some(PathSegment::Key(key.clone()));
                            if let Some(result) = collector.record(outcome, segment)? {
                                if let Some(out) = adapted.as_mut() {
                                    out.insert(key.clone(), result.into_owned());
                                }
                            }
                        }
                    }
                    Additional::Allow => {}
                }
            }
        }
        collector.finish()?;

        Ok(match adapted {
            Some(out) => Cow::Owned(Value::Map(out)),
            None => Cow::Borrowed(value),
        })
    }

    fn humanized_name(&self) -> String {
        self.base.humanized_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::Nullable;
    use crate::rules::{AdaptTo, Text};
    use crate::types::TypeClass;
    use crate::Error;
    use std::sync::Arc;

    fn integer() -> ValidatorRef {
        Arc::new(crate::types::Type::integer())
    }

    fn to_int() -> ValidatorRef {
        Arc::new(AdaptTo::new(TypeClass::Integral))
    }

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn test_homogeneous_sequence() {
        let seq = HomogeneousSequence::new(Some(integer()));
        assert!(seq.is_valid(&ints(&[1, 2, 3])));
        assert!(seq.is_valid(&Value::Tuple(vec![Value::Integer(1)])));
        assert!(!seq.is_valid(&Value::from("123")));

        let err = seq
            .validate(&Value::List(vec![Value::Integer(1), Value::from("2")]), false)
            .unwrap_err();
        assert_eq!(err.errors()[0].path(), vec![&PathSegment::Index(1)]);
        assert_eq!(err.errors()[0].value(), Some(&Value::from("2")));
    }

    #[test]
    fn test_sequence_length_bounds() {
        let seq = HomogeneousSequence::new(None).min_length(2).max_length(3);
        let err = seq.validate(&ints(&[]), false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "must contain at least 2 elements");
        let err = seq.validate(&ints(&[1, 2, 3, 4]), false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "must contain at most 3 elements");
        assert!(seq.is_valid(&Value::List(vec![Value::Null, Value::from("x")])));
    }

    #[test]
    fn test_sequence_adapt_keeps_kind() {
        let seq = HomogeneousSequence::new(Some(to_int()));
        let tuple = Value::Tuple(vec![Value::from("1"), Value::Float(2.5)]);
        assert_eq!(
            seq.adapt(&tuple).unwrap(),
            Value::Tuple(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn test_sequence_full_validation_collects_every_item() {
        let seq = HomogeneousSequence::new(Some(integer()));
        let value = Value::List(vec![Value::from("a"), Value::Integer(1), Value::from("b")]);
        let err = seq.full_validate(&value, false).unwrap_err();
        let positions: Vec<_> = err.errors().iter().map(|e| e.path()[0].clone()).collect();
        assert_eq!(positions, vec![PathSegment::Index(0), PathSegment::Index(2)]);
    }

    #[test]
    fn test_heterogeneous_sequence() {
        let pair = HeterogeneousSequence::new([integer(), Arc::new(Text::new()) as ValidatorRef]);
        assert!(pair.is_valid(&Value::List(vec![Value::Integer(1), Value::from("a")])));

        let err = pair.validate(&ints(&[1, 2, 3]), false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "2 items expected, 3 found");

        let err = pair.validate(&ints(&[1, 2]), false).unwrap_err();
        assert_eq!(err.errors()[0].path(), vec![&PathSegment::Index(1)]);
    }

    #[test]
    fn test_mapping() {
        let mapping = Mapping::new(Some(Arc::new(Text::new())), Some(to_int()));
        let value = Value::object([("a", Value::from("1")), ("b", Value::Integer(2))]);
        assert_eq!(
            mapping.adapt(&value).unwrap(),
            Value::object([("a", Value::Integer(1)), ("b", Value::Integer(2))])
        );

        let err = mapping
            .validate(&Value::object([("a", Value::from("x"))]), true)
            .unwrap_err();
        assert_eq!(err.errors()[0].path(), vec![&PathSegment::from("a")]);

        let mut bad_key = Map::new();
        bad_key.insert(1, 1);
        let err = mapping.validate(&Value::Map(bad_key), true).unwrap_err();
        assert!(err.errors()[0].context().is_empty());
        assert!(!mapping.is_valid(&ints(&[1])));
    }

    #[test]
    fn test_mapping_adapts_large_map() {
        let mapping = Mapping::new(Some(Arc::new(Text::new())), Some(to_int()));
        let value = Value::Map(
            (0..20_000)
                .map(|i| (Value::String(format!("k{i}")), Value::String(i.to_string())))
                .collect(),
        );
        let adapted = mapping.adapt(&value).unwrap();
        let map = adapted.as_map().unwrap();
        assert_eq!(map.len(), 20_000);
        assert_eq!(map.get_str("k19999"), Some(&Value::Integer(19_999)));
        assert_eq!(map.keys().next(), Some(&Value::from("k0")));
    }

    #[test]
    fn test_mapping_adapt_builds_new_map() {
        let mapping = Mapping::new(None, None);
        let value = Value::object([("a", Value::Integer(1))]);
        assert!(matches!(mapping.validate(&value, true), Ok(Cow::Owned(_))));
        assert!(matches!(mapping.validate(&value, false), Ok(Cow::Borrowed(_))));
    }

    fn person(additional: Additional) -> Object {
        Object::new(
            [
                ("name".to_string(), Arc::new(Text::new()) as ValidatorRef),
                (
                    "age".to_string(),
                    Arc::new(Nullable::new(integer()).with_default(Value::Integer(18)))
                        as ValidatorRef,
                ),
            ],
            [("id".to_string(), integer())],
            additional,
        )
    }

    #[test]
    fn test_object_missing_required() {
        let err = person(Additional::Allow)
            .validate(&Value::object([("name", Value::from("x"))]), true)
            .unwrap_err();
        assert_eq!(err.errors()[0].message(), r#"missing required properties: ["id"]"#);
    }

    #[test]
    fn test_object_backfills_nullable_defaults() {
        let value = Value::object([("id", Value::Integer(1))]);
        let adapted = person(Additional::Allow).adapt(&value).unwrap();
        assert_eq!(
            adapted,
            Value::object([("id", Value::Integer(1)), ("age", Value::Integer(18))])
        );
        assert!(matches!(
            person(Additional::Allow).validate(&value, false),
            Ok(Cow::Borrowed(_))
        ));
    }

    #[test]
    fn test_object_additional_policies() {
        let value = Value::object([("id", Value::Integer(1)), ("extra", Value::from("x"))]);

        let kept = person(Additional::Allow).adapt(&value).unwrap();
        assert!(kept.as_map().unwrap().contains_str("extra"));

        let err = person(Additional::Deny).validate(&value, true).unwrap_err();
        assert_eq!(err.errors()[0].message(), r#"additional properties: ["extra"]"#);

        let removed = person(Additional::Remove).adapt(&value).unwrap();
        assert!(!removed.as_map().unwrap().contains_str("extra"));
        assert!(person(Additional::Remove).is_valid(&value));

        let schema = person(Additional::Schema(integer()));
        let err = schema.validate(&value, true).unwrap_err();
        assert_eq!(err.errors()[0].path(), vec![&PathSegment::from("extra")]);
    }

    #[test]
    fn test_object_full_validation_continues_past_missing() {
        let value = Value::object([("name", Value::Integer(1)), ("extra", Value::Null)]);
        let err = person(Additional::Deny).full_validate(&value, false).unwrap_err();
        let messages: Vec<&str> = err.errors().iter().map(ValidationError::message).collect();
        assert_eq!(
            messages,
            vec![
                r#"missing required properties: ["id"]"#,
                "must be string",
                r#"additional properties: ["extra"]"#,
            ]
        );
        assert!(matches!(err, Error::Aggregate(_)));
    }

    #[test]
    fn test_required_overrides_optional() {
        let object = Object::new(
            [("a".to_string(), Arc::new(Text::new()) as ValidatorRef)],
            [("a".to_string(), integer())],
            Additional::Allow,
        );
        assert_eq!(object.properties().len(), 1);
        assert_eq!(object.required_properties(), ["a".to_string()]);
        assert!(object.is_valid(&Value::object([("a", Value::Integer(1))])));
    }
}
