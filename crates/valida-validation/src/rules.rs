//! Leaf validation rules

use crate::engine::{ValidationMode, Validator, ValidatorRef};
use crate::error::ValidationError;
use crate::types::{Type, TypeClass};
use crate::{Error, Result};
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use valida_value::{ErrorKind, Value};

/// Fallible boolean test over a value
pub type PredicateFn = Arc<dyn Fn(&Value) -> valida_value::Result<bool> + Send + Sync>;

/// Fallible value transformation
pub type AdaptorFn = Arc<dyn Fn(&Value) -> valida_value::Result<Value> + Send + Sync>;

/// Which failure kinds a predicate or adaptor turns into validation errors
///
/// Failures that are not trapped escape as [`Error::Fault`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Traps {
    #[default]
    All,
    Nothing,
    Only(Vec<ErrorKind>),
}

impl Traps {
    pub fn only(kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        Traps::Only(kinds.into_iter().collect())
    }

    #[must_use]
    pub fn traps(&self, kind: ErrorKind) -> bool {
        match self {
            Traps::All => true,
            Traps::Nothing => false,
            Traps::Only(kinds) => kinds.contains(&kind),
        }
    }
}

/// String validator with optional length bounds, counted in characters
#[derive(Debug, Clone)]
pub struct Text {
    base: Type,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            base: Type::new([TypeClass::String]).named("string"),
            min_length: None,
            max_length: None,
        }
    }
}

impl Text {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

impl Validator for Text {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        self.base.check(value, mode)?;
        let length = value.len().unwrap_or_default();
        if let Some(min) = self.min_length {
            if length < min {
                let msg = format!("must be at least {min} characters long");
                return Err(ValidationError::invalid(msg, value).into());
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                let msg = format!("must be at most {max} characters long");
                return Err(ValidationError::invalid(msg, value).into());
            }
        }
        Ok(Cow::Borrowed(value))
    }

    fn name(&self) -> Option<&str> {
        self.base.name()
    }

    fn humanized_name(&self) -> String {
        self.base.humanized_name()
    }
}

/// String validator requiring a regex match at the start of the string
///
/// The regex is used as given, so flags set through `RegexBuilder` apply.
#[derive(Debug, Clone)]
pub struct Pattern {
    base: Text,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    /// Build from an already compiled regex
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            base: Text::new(),
            regex,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    /// Leftmost-first search finds a match at offset 0 whenever one exists
    fn matches_at_start(&self, text: &str) -> bool {
        self.regex.find(text).is_some_and(|m| m.start() == 0)
    }
}

impl Validator for Pattern {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        self.base.check(value, mode)?;
        match value.as_str() {
            Some(text) if self.matches_at_start(text) => Ok(Cow::Borrowed(value)),
            _ => Err(self.error(value).into()),
        }
    }

    fn humanized_name(&self) -> String {
        format!("pattern {}", self.source())
    }

    fn error(&self, value: &Value) -> ValidationError {
        ValidationError::invalid(format!("must match {}", self.humanized_name()), value)
    }
}

/// Numeric bounds on the output of an optional inner validator
#[derive(Debug, Clone)]
pub struct Range {
    inner: Option<ValidatorRef>,
    min: Option<Value>,
    max: Option<Value>,
}

impl Range {
    #[must_use]
    pub fn new(inner: Option<ValidatorRef>) -> Self {
        Self {
            inner,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub fn min(mut self, min: impl Into<Value>) -> Self {
        self.min = Some(min.into());
        self
    }

    #[must_use]
    pub fn max(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Set both bounds, either of which may be absent
    #[must_use]
    pub fn bounds(mut self, min: Option<Value>, max: Option<Value>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Ordering against a bound; `None` when either side is NaN, which
    /// satisfies every bound
    fn compare(value: &Value, bound: &Value) -> Result<Option<Ordering>> {
        if !value.is_number() {
            return Err(ValidationError::invalid("must be number", value).into());
        }
        Ok(value.compare_numeric(bound))
    }
}

impl Validator for Range {
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>> {
        let checked = match &self.inner {
            Some(inner) => inner.check(value, mode)?,
            None => Cow::Borrowed(value),
        };
        if let Some(min) = &self.min {
            if Self::compare(&checked, min)? == Some(Ordering::Less) {
                let msg = format!("must not be less than {min}");
                return Err(ValidationError::invalid(msg, &checked).into());
            }
        }
        if let Some(max) = &self.max {
            if Self::compare(&checked, max)? == Some(Ordering::Greater) {
                let msg = format!("must not be larger than {max}");
                return Err(ValidationError::invalid(msg, &checked).into());
            }
        }
        Ok(checked)
    }

    fn humanized_name(&self) -> String {
        match &self.inner {
            Some(inner) => inner.humanized_name(),
            None => "number".to_string(),
        }
    }
}

/// Accepts values satisfying a predicate
#[derive(Clone)]
pub struct Condition {
    label: String,
    predicate: PredicateFn,
    traps: Traps,
}

impl Condition {
    /// Wrap an infallible predicate
    pub fn new(
        label: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::fallible(label, move |value| Ok(predicate(value)))
    }

    /// Wrap a predicate that may fail; failures are trapped by default
    pub fn fallible(
        label: impl Into<String>,
        predicate: impl Fn(&Value) -> valida_value::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(label, Arc::new(predicate))
    }

    pub fn from_fn(label: impl Into<String>, predicate: PredicateFn) -> Self {
        Self {
            label: label.into(),
            predicate,
            traps: Traps::All,
        }
    }

    #[must_use]
    pub fn with_traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("label", &self.label)
            .field("traps", &self.traps)
            .finish_non_exhaustive()
    }
}

impl Validator for Condition {
    fn check<'v>(&self, value: &'v Value, _mode: ValidationMode) -> Result<Cow<'v, Value>> {
        match (self.predicate)(value) {
            Ok(true) => Ok(Cow::Borrowed(value)),
            Ok(false) => Err(self.error(value).into()),
            Err(fault) if self.traps.traps(fault.kind()) => Err(self.error(value).into()),
            Err(fault) => Err(Error::Fault(fault)),
        }
    }

    fn humanized_name(&self) -> String {
        self.label.clone()
    }

    fn error(&self, value: &Value) -> ValidationError {
        ValidationError::invalid(format!("must satisfy predicate {}", self.label), value)
    }
}

/// Adapts values by applying a function; a trapped failure rejects the value
///
/// The adaptor runs in check-only mode too, since its success decides validity.
#[derive(Clone)]
pub struct AdaptBy {
    label: String,
    adaptor: AdaptorFn,
    traps: Traps,
}

impl AdaptBy {
    pub fn new(
        label: impl Into<String>,
        adaptor: impl Fn(&Value) -> valida_value::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(label, Arc::new(adaptor))
    }

    pub fn from_fn(label: impl Into<String>, adaptor: AdaptorFn) -> Self {
        Self {
            label: label.into(),
            adaptor,
            traps: Traps::All,
        }
    }

    #[must_use]
    pub fn with_traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }
}

impl fmt::Debug for AdaptBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptBy")
            .field("label", &self.label)
            .field("traps", &self.traps)
            .finish_non_exhaustive()
    }
}

impl Validator for AdaptBy {
    fn check<'v>(&self, value: &'v Value, _mode: ValidationMode) -> Result<Cow<'v, Value>> {
        match (self.adaptor)(value) {
            Ok(adapted) => Ok(Cow::Owned(adapted)),
            Err(fault) if self.traps.traps(fault.kind()) => {
                Err(ValidationError::invalid(fault.to_string(), value).into())
            }
            Err(fault) => Err(Error::Fault(fault)),
        }
    }

    fn humanized_name(&self) -> String {
        self.label.clone()
    }
}

/// Adapts values by converting them to a target type class
///
/// Values already in the class pass through untouched unless `exact` is set,
/// in which case only the class's canonical kind passes through.
#[derive(Debug, Clone)]
pub struct AdaptTo {
    target: TypeClass,
    exact: bool,
    traps: Traps,
}

impl AdaptTo {
    #[must_use]
    pub fn new(target: TypeClass) -> Self {
        Self {
            target,
            exact: false,
            traps: Traps::All,
        }
    }

    #[must_use]
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    #[must_use]
    pub fn with_traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }

    fn passes_through(&self, value: &Value) -> bool {
        if self.exact {
            value.kind() == self.target.canonical_kind()
        } else {
            self.target.matches(value)
        }
    }
}

impl Validator for AdaptTo {
    fn check<'v>(&self, value: &'v Value, _mode: ValidationMode) -> Result<Cow<'v, Value>> {
        if self.passes_through(value) {
            return Ok(Cow::Borrowed(value));
        }
        match value.convert(self.target.canonical_kind()) {
            Ok(converted) => Ok(Cow::Owned(converted)),
            Err(fault) if self.traps.traps(fault.kind()) => {
                Err(ValidationError::invalid(fault.to_string(), value).into())
            }
            Err(fault) => Err(Error::Fault(fault)),
        }
    }

    fn humanized_name(&self) -> String {
        self.target.name().to_string()
    }
}
