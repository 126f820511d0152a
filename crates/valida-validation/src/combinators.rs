//! Validators composed from other validators

use crate::engine::{Collector, Nullability, ValidationMode, Validator, ValidatorRef};
use crate::error::ValidationError;
use crate::types::humanize_alternatives;
use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use valida_value::Value;

/// Accepts a value if any branch accepts it; the first accepting branch wins
#[derive(Debug, Clone)]
pub struct AnyOf {
    validators: Vec<ValidatorRef>,
}

impl AnyOf {
    pub fn new(validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        Self {
            validators: validators.into_iter().collect(),
        }
    }
}

impl Validator for AnyOf {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let mut reasons = Vec::with_capacity(self.validators.len());
        for validator in &self.validators {
            match validator.check(value, mode) {
                Ok(result) => return Ok(result),
                Err(fault @ Error::Fault(_)) => return Err(fault),
                Err(err) => reasons.push(err.summary()),
            }
        }
        Err(ValidationError::invalid(reasons.join(" or "), value).into())
    }

    fn humanized_name(&self) -> String {
        let names: Vec<String> = self.validators.iter().map(|v| v.humanized_name()).collect();
        humanize_alternatives(&names)
    }
}

/// Accepts a value only if every branch accepts it
///
/// Each branch sees the original value; the output of the last branch is
/// the result.
#[derive(Debug, Clone)]
pub struct AllOf {
    validators: Vec<ValidatorRef>,
}

impl AllOf {
    pub fn new(validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        Self {
            validators: validators.into_iter().collect(),
        }
    }
}

impl Validator for AllOf {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let mut collector = Collector::new(mode);
        let mut result = Cow::Borrowed(value);
        for validator in &self.validators {
            if let Some(output) = collector.record(validator.check(value, mode), None)? {
                result = output;
            }
        }
        collector.finish()?;
        Ok(result)
    }

    fn humanized_name(&self) -> String {
        let names: Vec<String> = self.validators.iter().map(|v| v.humanized_name()).collect();
        names.join(" and ")
    }
}

/// Feeds the output of each validator to the next one
#[derive(Debug, Clone)]
pub struct ChainOf {
    validators: Vec<ValidatorRef>,
}

impl ChainOf {
    pub fn new(validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        Self {
            validators: validators.into_iter().collect(),
        }
    }
}

impl Validator for ChainOf {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let mut current = Cow::Borrowed(value);
        for validator in &self.validators {
            current = match current {
                Cow::Borrowed(borrowed) => validator.check(borrowed, mode)?,
                Cow::Owned(owned) => Cow::Owned(validator.check(&owned, mode)?.into_owned()),
            };
        }
        Ok(current)
    }

    fn humanized_name(&self) -> String {
        let names: Vec<String> = self.validators.iter().map(|v| v.humanized_name()).collect();
        names.join(" chained to ")
    }
}

/// Value substituted for null by [`Nullable`]
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Called anew on every substitution
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn producer(produce: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultValue::Producer(Arc::new(produce))
    }

    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(produce) => produce(),
        }
    }
}

impl Default for DefaultValue {
    fn default() -> Self {
        DefaultValue::Value(Value::Null)
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Accepts null, replacing it with a default; anything else goes to the inner validator
#[derive(Debug, Clone)]
pub struct Nullable {
    inner: ValidatorRef,
    default: DefaultValue,
}

impl Nullable {
    #[must_use]
    pub fn new(inner: ValidatorRef) -> Self {
        Self {
            inner,
            default: DefaultValue::default(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn inner(&self) -> &ValidatorRef {
        &self.inner
    }

    #[must_use]
    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// Strip one level of nullable or non-nullable wrapping
    ///
    /// A bare non-nullable check is kept as is.
    #[must_use]
    pub fn unwrap_nullability(validator: ValidatorRef) -> ValidatorRef {
        let inner = validator
            .nullability()
            .and_then(|nullability| nullability.inner())
            .cloned();
        inner.unwrap_or(validator)
    }
}

impl Validator for Nullable {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        if value.is_null() {
            return Ok(Cow::Owned(self.default.resolve()));
        }
        self.inner.check(value, mode)
    }

    fn humanized_name(&self) -> String {
        format!("{} or null", self.inner.humanized_name())
    }

    fn nullability(&self) -> Option<Nullability<'_>> {
        Some(Nullability::Nullable {
            inner: &self.inner,
            default: &self.default,
        })
    }
}

/// Rejects null; anything else goes to the inner validator, if present
#[derive(Debug, Clone, Default)]
pub struct NonNullable {
    inner: Option<ValidatorRef>,
}

impl NonNullable {
    #[must_use]
    pub fn new(inner: Option<ValidatorRef>) -> Self {
        Self { inner }
    }
}

impl Validator for NonNullable {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        if value.is_null() {
            return Err(self.error(value).into());
        }
        match &self.inner {
            Some(inner) => inner.check(value, mode),
            None => Ok(Cow::Borrowed(value)),
        }
    }

    fn humanized_name(&self) -> String {
        match &self.inner {
            Some(inner) => inner.humanized_name(),
            None => "non null".to_string(),
        }
    }

    fn nullability(&self) -> Option<Nullability<'_>> {
        Some(Nullability::NonNullable {
            inner: self.inner.as_ref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AdaptBy, AdaptTo, Range};
    use crate::types::{Type, TypeClass};
    use chrono::{DateTime, NaiveDateTime};

    fn integer() -> ValidatorRef {
        Arc::new(Type::integer())
    }

    fn string() -> ValidatorRef {
        Arc::new(crate::rules::Text::new())
    }

    fn from_timestamp() -> ValidatorRef {
        Arc::new(AdaptBy::new("from_timestamp", |v| {
            let secs = v
                .as_i64()
                .ok_or_else(|| valida_value::Error::type_mismatch("integer", v))?;
            DateTime::from_timestamp(secs, 0)
                .map(|dt| Value::DateTime(dt.naive_utc()))
                .ok_or_else(|| valida_value::Error::out_of_range("timestamp", v))
        }))
    }

    fn epoch_plus(secs: i64) -> Value {
        let dt: NaiveDateTime = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
        Value::DateTime(dt)
    }

    #[test]
    fn test_any_of_first_match_wins() {
        let either = AnyOf::new([integer(), string()]);
        assert!(either.is_valid(&Value::Integer(1)));
        assert!(either.is_valid(&Value::from("1")));
        assert!(!either.is_valid(&Value::Float(1.5)));

        let err = either.validate(&Value::Null, false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "must be integer or must be string");
        assert_eq!(either.humanized_name(), "integer or string");
    }

    #[test]
    fn test_any_of_order_decides_adaptation() {
        let to_float: ValidatorRef = Arc::new(AdaptTo::new(TypeClass::Float));
        let to_int: ValidatorRef = Arc::new(AdaptTo::new(TypeClass::Integral));

        let float_first = AnyOf::new([to_float.clone(), to_int.clone()]);
        assert!(matches!(float_first.adapt(&Value::from("1")).unwrap(), Value::Float(_)));

        let int_first = AnyOf::new([to_int, to_float]);
        assert!(matches!(int_first.adapt(&Value::from("1")).unwrap(), Value::Integer(1)));
    }

    #[test]
    fn test_all_of_returns_last_output() {
        let both = AllOf::new([integer(), from_timestamp()]);
        assert_eq!(both.adapt(&Value::Integer(1000)).unwrap(), epoch_plus(1000));
        assert!(!both.is_valid(&Value::from("1000")));
    }

    #[test]
    fn test_all_of_collects_branch_failures() {
        let both = AllOf::new([integer(), Arc::new(Range::new(None).min(10))]);
        let err = both.full_validate(&Value::Float(1.5), false).unwrap_err();
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_chain_of_feeds_outputs_forward() {
        let to_int: ValidatorRef = Arc::new(AdaptTo::new(TypeClass::Integral));
        let chain = ChainOf::new([to_int, from_timestamp()]);
        assert_eq!(chain.adapt(&Value::from("1000")).unwrap(), epoch_plus(1000));
        assert!(!chain.is_valid(&Value::from("x")));
    }

    #[test]
    fn test_nullable_default() {
        let nullable = Nullable::new(integer()).with_default(Value::Integer(5));
        assert_eq!(nullable.adapt(&Value::Null).unwrap(), Value::Integer(5));
        assert_eq!(nullable.adapt(&Value::Integer(3)).unwrap(), Value::Integer(3));
        assert!(!nullable.is_valid(&Value::from("3")));
        assert_eq!(nullable.humanized_name(), "integer or null");
    }

    #[test]
    fn test_nullable_default_producer_runs_each_time() {
        let counter = Arc::new(std::sync::atomic::AtomicI64::new(0));
        let seen = Arc::clone(&counter);
        let nullable = Nullable::new(integer()).with_default(DefaultValue::producer(move || {
            Value::Integer(seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
        }));
        assert_eq!(nullable.adapt(&Value::Null).unwrap(), Value::Integer(0));
        assert_eq!(nullable.adapt(&Value::Null).unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_non_nullable() {
        let required = NonNullable::new(Some(integer()));
        let err = required.validate(&Value::Null, false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "must be integer");
        assert!(required.is_valid(&Value::Integer(1)));

        let anything = NonNullable::default();
        assert!(anything.is_valid(&Value::from("x")));
        let err = anything.validate(&Value::Null, false).unwrap_err();
        assert_eq!(err.errors()[0].message(), "must be non null");
    }

    #[test]
    fn test_unwrap_nullability() {
        let wrapped: ValidatorRef = Arc::new(Nullable::new(integer()));
        let unwrapped = Nullable::unwrap_nullability(wrapped);
        assert!(!unwrapped.is_valid(&Value::Null));

        let bare: ValidatorRef = Arc::new(NonNullable::default());
        let kept = Nullable::unwrap_nullability(bare);
        assert!(kept.nullability().is_some());
    }
}
