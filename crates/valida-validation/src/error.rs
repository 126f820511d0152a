//! Validation failures with positional context

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use valida_value::{Value, ValueKind};

/// One step of the location of a failure inside a nested value
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Property name or mapping key
    Key(Value),
    /// Position inside a sequence
    Index(usize),
}

impl PathSegment {
    fn write_bare(&self, out: &mut String, format: &ErrorFormat) {
        match self {
            PathSegment::Key(Value::String(s)) => out.push_str(s),
            PathSegment::Key(other) => out.push_str(&format.repr(other)),
            PathSegment::Index(idx) => out.push_str(&idx.to_string()),
        }
    }

    fn write_subscript(&self, out: &mut String, format: &ErrorFormat) {
        out.push('[');
        match self {
            PathSegment::Key(key) => out.push_str(&format.repr(key)),
            PathSegment::Index(idx) => out.push_str(&idx.to_string()),
        }
        out.push(']');
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(Value::from(key))
    }
}

impl From<Value> for PathSegment {
    fn from(key: Value) -> Self {
        PathSegment::Key(key)
    }
}

type ReprFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Rendering options for error messages
///
/// Lets callers rename the type names printed next to offending values and
/// replace the default value representation.
#[derive(Clone, Default)]
pub struct ErrorFormat {
    type_names: HashMap<ValueKind, String>,
    value_repr: Option<ReprFn>,
}

impl ErrorFormat {
    /// Create the default format
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate one or more value kinds with an alternative name
    #[must_use]
    pub fn with_type_name(
        mut self,
        name: impl Into<String>,
        kinds: impl IntoIterator<Item = ValueKind>,
    ) -> Self {
        let name = name.into();
        for kind in kinds {
            self.type_names.insert(kind, name.clone());
        }
        self
    }

    /// Replace the representation used for offending values
    #[must_use]
    pub fn with_value_repr(mut self, repr: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.value_repr = Some(Arc::new(repr));
        self
    }

    /// JSON flavoured format: JSON type names and JSON value rendering
    #[must_use]
    pub fn json() -> Self {
        Self::new()
            .with_type_name("number", [ValueKind::Float])
            .with_type_name("array", [ValueKind::List, ValueKind::Tuple])
            .with_type_name("object", [ValueKind::Map])
            .with_value_repr(|value| value.to_json().to_string())
    }

    #[must_use]
    pub fn type_name(&self, kind: ValueKind) -> &str {
        self.type_names.get(&kind).map_or(kind.name(), String::as_str)
    }

    #[must_use]
    pub fn repr(&self, value: &Value) -> String {
        match &self.value_repr {
            Some(repr) => repr(value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for ErrorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorFormat")
            .field("type_names", &self.type_names)
            .field("custom_repr", &self.value_repr.is_some())
            .finish()
    }
}

/// A single validation failure
///
/// The context path is stored innermost first: each enclosing container
/// appends its own key or index while the error travels outward.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
    value: Option<Value>,
    context: Vec<PathSegment>,
}

impl ValidationError {
    /// Create an error without an offending value
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: None,
            context: Vec::new(),
        }
    }

    /// Create an error about an offending value
    pub fn invalid(message: impl Into<String>, value: &Value) -> Self {
        Self {
            message: message.into(),
            value: Some(value.clone()),
            context: Vec::new(),
        }
    }

    /// The bare failure reason
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The value that failed, if any
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Context segments, innermost first
    #[must_use]
    pub fn context(&self) -> &[PathSegment] {
        &self.context
    }

    /// Context segments, outermost first
    #[must_use]
    pub fn path(&self) -> Vec<&PathSegment> {
        self.context.iter().rev().collect()
    }

    /// Record the key or index of an enclosing container
    pub fn add_context(&mut self, segment: impl Into<PathSegment>) {
        self.context.push(segment.into());
    }

    #[must_use]
    pub fn with_context(mut self, segment: impl Into<PathSegment>) -> Self {
        self.add_context(segment);
        self
    }

    /// Render using custom type names and value representation
    #[must_use]
    pub fn render(&self, format: &ErrorFormat) -> String {
        let mut out = match &self.value {
            Some(value) => format!(
                "Invalid value {} ({}): {}",
                format.repr(value),
                format.type_name(value.kind()),
                self.message
            ),
            None => self.message.clone(),
        };
        if !self.context.is_empty() {
            out.push_str(" (at ");
            for (idx, segment) in self.context.iter().rev().enumerate() {
                if idx == 0 {
                    segment.write_bare(&mut out, format);
                } else {
                    segment.write_subscript(&mut out, format);
                }
            }
            out.push(')');
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&ErrorFormat::default()))
    }
}

impl std::error::Error for ValidationError {}

/// Every failure found by a full validation pass
///
/// Always flat: absorbing another aggregate splices its members in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateError {
    errors: Vec<ValidationError>,
}

impl AggregateError {
    pub fn new(errors: impl IntoIterator<Item = ValidationError>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add the members of another aggregate
    pub fn extend(&mut self, other: AggregateError) {
        self.errors.extend(other.errors);
    }

    /// Record the key or index of an enclosing container on every member
    pub fn add_context(&mut self, segment: impl Into<PathSegment>) {
        let segment = segment.into();
        for error in &mut self.errors {
            error.add_context(segment.clone());
        }
    }

    #[must_use]
    pub fn render(&self, format: &ErrorFormat) -> String {
        let mut out = String::new();
        for error in &self.errors {
            out.push_str("\n- ");
            out.push_str(&error.render(format));
        }
        out
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&ErrorFormat::default()))
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_value_and_path() {
        let error = ValidationError::invalid("must be integer", &Value::from("2"))
            .with_context(1)
            .with_context("bar");

        assert_eq!(
            error.to_string(),
            r#"Invalid value "2" (string): must be integer (at bar[1])"#
        );
        assert_eq!(
            error.path(),
            vec![&PathSegment::from("bar"), &PathSegment::Index(1)]
        );
        assert_eq!(error.context()[0], PathSegment::Index(1));
    }

    #[test]
    fn test_render_nested_keys() {
        let error = ValidationError::invalid("must be string", &Value::Integer(1))
            .with_context("s2")
            .with_context(0)
            .with_context("l");
        assert_eq!(
            error.to_string(),
            r#"Invalid value 1 (integer): must be string (at l[0]["s2"])"#
        );
    }

    #[test]
    fn test_render_without_value() {
        let error = ValidationError::new("2 items expected, 3 found");
        assert_eq!(error.to_string(), "2 items expected, 3 found");
    }

    #[test]
    fn test_custom_format() {
        let format = ErrorFormat::json().with_type_name("integer", [ValueKind::Integer]);
        let error = ValidationError::invalid("must be number", &Value::Null).with_context("foo");
        assert_eq!(
            error.render(&format),
            "Invalid value null (null): must be number (at foo)"
        );

        let error = ValidationError::invalid("must be integer", &Value::object([("a", Value::Integer(3))]))
            .with_context(1)
            .with_context("bar");
        assert_eq!(
            error.render(&format),
            r#"Invalid value {"a":3} (object): must be integer (at bar[1])"#
        );
    }

    #[test]
    fn test_aggregate_context_and_render() {
        let mut aggregate = AggregateError::new([
            ValidationError::invalid("must be integer", &Value::from("a")).with_context(0),
            ValidationError::invalid("must be integer", &Value::from("b")).with_context(2),
        ]);
        aggregate.add_context("ids");

        assert_eq!(aggregate.len(), 2);
        assert_eq!(
            aggregate.to_string(),
            "\n- Invalid value \"a\" (string): must be integer (at ids[0])\
             \n- Invalid value \"b\" (string): must be integer (at ids[2])"
        );
    }
}
