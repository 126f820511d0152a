//! Type classes and the type-check validator

use crate::engine::{ValidationMode, Validator};
use crate::Result;
use std::borrow::Cow;
use std::fmt;
use valida_value::{Value, ValueKind};

/// A class of runtime values a type check can accept or reject
///
/// Some classes nest: booleans are integral, integral values and floats are
/// numbers, and lists and tuples are sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Null,
    Boolean,
    /// Integers and booleans
    Integral,
    Float,
    /// Integers, floats and booleans
    Number,
    String,
    Bytes,
    /// Dates, datetimes included
    Date,
    Time,
    DateTime,
    /// Lists and tuples
    Sequence,
    List,
    Tuple,
    Mapping,
}

impl TypeClass {
    /// Whether `value` belongs to this class
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            TypeClass::Null => matches!(value, Value::Null),
            TypeClass::Boolean => matches!(value, Value::Bool(_)),
            TypeClass::Integral => matches!(value, Value::Bool(_) | Value::Integer(_)),
            TypeClass::Float => matches!(value, Value::Float(_)),
            TypeClass::Number => {
                matches!(value, Value::Bool(_) | Value::Integer(_) | Value::Float(_))
            }
            TypeClass::String => matches!(value, Value::String(_)),
            TypeClass::Bytes => matches!(value, Value::Bytes(_)),
            TypeClass::Date => matches!(value, Value::Date(_) | Value::DateTime(_)),
            TypeClass::Time => matches!(value, Value::Time(_)),
            TypeClass::DateTime => matches!(value, Value::DateTime(_)),
            TypeClass::Sequence => matches!(value, Value::List(_) | Value::Tuple(_)),
            TypeClass::List => matches!(value, Value::List(_)),
            TypeClass::Tuple => matches!(value, Value::Tuple(_)),
            TypeClass::Mapping => matches!(value, Value::Map(_)),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Null => "null",
            TypeClass::Boolean => "boolean",
            TypeClass::Integral => "integer",
            TypeClass::Float => "float",
            TypeClass::Number => "number",
            TypeClass::String => "string",
            TypeClass::Bytes => "bytes",
            TypeClass::Date => "date",
            TypeClass::Time => "time",
            TypeClass::DateTime => "datetime",
            TypeClass::Sequence => "sequence",
            TypeClass::List => "list",
            TypeClass::Tuple => "tuple",
            TypeClass::Mapping => "mapping",
        }
    }

    /// The concrete kind values are converted to when adapting to this class
    #[must_use]
    pub fn canonical_kind(self) -> ValueKind {
        match self {
            TypeClass::Null => ValueKind::Null,
            TypeClass::Boolean => ValueKind::Bool,
            TypeClass::Integral => ValueKind::Integer,
            TypeClass::Float | TypeClass::Number => ValueKind::Float,
            TypeClass::String => ValueKind::String,
            TypeClass::Bytes => ValueKind::Bytes,
            TypeClass::Date => ValueKind::Date,
            TypeClass::Time => ValueKind::Time,
            TypeClass::DateTime => ValueKind::DateTime,
            TypeClass::Sequence | TypeClass::List => ValueKind::List,
            TypeClass::Tuple => ValueKind::Tuple,
            TypeClass::Mapping => ValueKind::Map,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Join names as "a, b or c"
pub(crate) fn humanize_alternatives<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} or {}", head.join(", "), last.as_ref())
        }
    }
}

/// Accepts values belonging to any accepted class and to no rejected class
#[derive(Debug, Clone)]
pub struct Type {
    name: Option<Cow<'static, str>>,
    accept: Vec<TypeClass>,
    reject: Vec<TypeClass>,
}

impl Type {
    pub fn new(accept: impl IntoIterator<Item = TypeClass>) -> Self {
        Self {
            name: None,
            accept: accept.into_iter().collect(),
            reject: Vec::new(),
        }
    }

    /// Exclude values of these classes even if otherwise accepted
    #[must_use]
    pub fn rejecting(mut self, reject: impl IntoIterator<Item = TypeClass>) -> Self {
        self.reject.extend(reject);
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        self.accept.iter().any(|class| class.matches(value))
            && !self.reject.iter().any(|class| class.matches(value))
    }

    #[must_use]
    pub fn accepted(&self) -> &[TypeClass] {
        &self.accept
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new([TypeClass::Boolean]).named("boolean")
    }

    /// Integral values, booleans excluded
    #[must_use]
    pub fn integer() -> Self {
        Self::new([TypeClass::Integral])
            .rejecting([TypeClass::Boolean])
            .named("integer")
    }

    /// Integers and floats, booleans excluded
    #[must_use]
    pub fn number() -> Self {
        Self::new([TypeClass::Number])
            .rejecting([TypeClass::Boolean])
            .named("number")
    }

    #[must_use]
    pub fn date() -> Self {
        Self::new([TypeClass::Date]).named("date")
    }

    #[must_use]
    pub fn datetime() -> Self {
        Self::new([TypeClass::DateTime]).named("datetime")
    }

    #[must_use]
    pub fn time() -> Self {
        Self::new([TypeClass::Time]).named("time")
    }

    /// Lists and tuples, the base check of sequence validators
    #[must_use]
    pub(crate) fn sequence() -> Self {
        Self::new([TypeClass::Sequence])
    }

    #[must_use]
    pub(crate) fn mapping() -> Self {
        Self::new([TypeClass::Mapping])
    }
}

impl Validator for Type {
    fn check<'v>(&self, value: &'v Value, _mode: ValidationMode) -> Result<Cow<'v, Value>> {
        if self.accepts(value) {
            Ok(Cow::Borrowed(value))
        } else {
            Err(self.error(value).into())
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn humanized_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => {
                let names: Vec<&str> = self.accept.iter().map(|class| class.name()).collect();
                humanize_alternatives(&names)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_rejects_booleans() {
        let integer = Type::integer();
        assert!(integer.is_valid(&Value::Integer(1)));
        assert!(!integer.is_valid(&Value::Bool(true)));
        assert!(!integer.is_valid(&Value::Float(1.0)));
        assert!(!integer.is_valid(&Value::from("1")));
    }

    #[test]
    fn test_number_accepts_ints_and_floats() {
        let number = Type::number();
        assert!(number.is_valid(&Value::Integer(1)));
        assert!(number.is_valid(&Value::Float(1.5)));
        assert!(!number.is_valid(&Value::Bool(false)));
        assert!(!number.is_valid(&Value::Null));
    }

    #[test]
    fn test_date_accepts_datetimes() {
        let when = chrono::NaiveDate::from_ymd_opt(2013, 7, 10).unwrap();
        assert!(Type::date().is_valid(&Value::Date(when)));
        assert!(Type::date().is_valid(&Value::DateTime(when.and_hms_opt(1, 2, 3).unwrap())));
        assert!(!Type::datetime().is_valid(&Value::Date(when)));
    }

    #[test]
    fn test_humanized_alternatives() {
        let t = Type::new([TypeClass::Integral, TypeClass::Float, TypeClass::String]);
        assert_eq!(t.humanized_name(), "integer, float or string");
        let err = t.validate(&Value::Null, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value null (null): must be integer, float or string"
        );

        assert_eq!(Type::new([TypeClass::Bytes]).humanized_name(), "bytes");
        assert_eq!(Type::boolean().name(), Some("boolean"));
    }
}
