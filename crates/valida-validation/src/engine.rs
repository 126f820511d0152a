//! Validation engine: the validator contract and execution modes

use crate::combinators::DefaultValue;
use crate::error::{AggregateError, PathSegment, ValidationError};
use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use valida_value::Value;

/// How a validation pass runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationMode {
    /// Produce the adapted value instead of only checking
    pub adapt: bool,
    /// Continue after the first failure and collect all of them
    pub continue_on_error: bool,
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::adapting()
    }
}

impl ValidationMode {
    /// Check only, stop at the first failure
    #[must_use]
    pub fn check() -> Self {
        Self {
            adapt: false,
            continue_on_error: false,
        }
    }

    /// Adapt, stop at the first failure
    #[must_use]
    pub fn adapting() -> Self {
        Self {
            adapt: true,
            continue_on_error: false,
        }
    }

    /// Same mode but collecting every failure
    #[must_use]
    pub fn collecting(self) -> Self {
        Self {
            continue_on_error: true,
            ..self
        }
    }
}

/// Shared handle to a compiled validator
pub type ValidatorRef = Arc<dyn Validator>;

/// How a validator treats null, exposed for unwrapping and default backfilling
#[derive(Debug, Clone, Copy)]
pub enum Nullability<'a> {
    /// Null is accepted and replaced by `default`
    Nullable {
        inner: &'a ValidatorRef,
        default: &'a DefaultValue,
    },
    /// Null is rejected
    NonNullable { inner: Option<&'a ValidatorRef> },
}

impl<'a> Nullability<'a> {
    /// The wrapped validator, if any
    #[must_use]
    pub fn inner(&self) -> Option<&'a ValidatorRef> {
        match *self {
            Nullability::Nullable { inner, .. } => Some(inner),
            Nullability::NonNullable { inner } => inner,
        }
    }
}

/// A validator checks a value and optionally adapts it
///
/// Implementors provide [`Validator::check`]; everything else has a default
/// built on top of it. In check-only mode a successful check returns the
/// input borrowed, so no copying happens unless something is adapted.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Validate `value` according to `mode`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] for a rejected value, [`Error::Aggregate`]
    /// when collecting, or [`Error::Fault`] for untrapped adaptor failures.
    fn check<'v>(&self, value: &'v Value, mode: ValidationMode) -> Result<Cow<'v, Value>>;

    /// Registered name, if this validator has one
    fn name(&self) -> Option<&str> {
        None
    }

    /// Human-friendly description used in error messages
    fn humanized_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => short_type_name(std::any::type_name_of_val(self)).to_string(),
        }
    }

    /// The standard "must be ..." failure for `value`
    fn error(&self, value: &Value) -> ValidationError {
        ValidationError::invalid(format!("must be {}", self.humanized_name()), value)
    }

    /// Nullable or non-nullable wrappers report themselves here
    fn nullability(&self) -> Option<Nullability<'_>> {
        None
    }

    /// Validate, stopping at the first failure
    ///
    /// # Errors
    ///
    /// See [`Validator::check`].
    fn validate<'v>(&self, value: &'v Value, adapt: bool) -> Result<Cow<'v, Value>> {
        self.check(
            value,
            ValidationMode {
                adapt,
                continue_on_error: false,
            },
        )
    }

    /// Validate, collecting every failure into one [`AggregateError`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregate`] for any validation failure, even a single
    /// one, or [`Error::Fault`] for untrapped adaptor failures.
    fn full_validate<'v>(&self, value: &'v Value, adapt: bool) -> Result<Cow<'v, Value>> {
        let mode = ValidationMode {
            adapt,
            continue_on_error: true,
        };
        self.check(value, mode).map_err(|err| match err {
            Error::Invalid(single) => Error::Aggregate(AggregateError::new([single])),
            other => other,
        })
    }

    /// Validate and return the adapted value
    ///
    /// # Errors
    ///
    /// See [`Validator::check`].
    fn adapt(&self, value: &Value) -> Result<Value> {
        self.validate(value, true).map(Cow::into_owned)
    }

    /// Whether `value` passes a check-only validation
    ///
    /// Faults are logged and counted as invalid.
    fn is_valid(&self, value: &Value) -> bool {
        match self.validate(value, false) {
            Ok(_) => true,
            Err(Error::Fault(fault)) => {
                warn!(validator = %self.humanized_name(), %fault, "Fault while checking value");
                false
            }
            Err(_) => false,
        }
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Error bookkeeping for containers and multi-branch combinators
///
/// In fail-fast mode the first failure is handed back immediately; in
/// collect mode failures are flattened into one aggregate and the caller
/// carries on. Faults always propagate.
#[derive(Debug)]
pub(crate) struct Collector {
    continue_on_error: bool,
    errors: AggregateError,
}

impl Collector {
    pub(crate) fn new(mode: ValidationMode) -> Self {
        Self {
            continue_on_error: mode.continue_on_error,
            errors: AggregateError::default(),
        }
    }

    /// Record a failure found at `segment`
    pub(crate) fn fail(&mut self, err: Error, segment: Option<PathSegment>) -> Result<()> {
        let err = match segment {
            Some(segment) => err.with_context(segment),
            None => err,
        };
        if !self.continue_on_error {
            return Err(err);
        }
        match err {
            Error::Invalid(single) => self.errors.push(single),
            Error::Aggregate(agg) => self.errors.extend(agg),
            fault @ Error::Fault(_) => return Err(fault),
        }
        Ok(())
    }

    /// Unwrap a child outcome; `None` means the failure was collected
    pub(crate) fn record<T>(
        &mut self,
        outcome: Result<T>,
        segment: Option<PathSegment>,
    ) -> Result<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.fail(err, segment).map(|()| None),
        }
    }

    /// Turn the collected failures, if any, into the final outcome
    pub(crate) fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        debug!(errors = self.errors.len(), "Collected validation errors");
        Err(Error::Aggregate(self.errors))
    }
}
