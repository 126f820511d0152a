#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # valida-validation
//!
//! The validator contract and the built-in validators.
//!
//! Every validator answers one question: given a value, is it acceptable,
//! and if adapting, what is its normalized form? Leaf validators check a
//! single value, combinators compose other validators and containers
//! descend into sequences and mappings, tagging failures with the key or
//! index where they happened.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use valida_validation::{HomogeneousSequence, Type, Validator};
//! use valida_value::Value;
//!
//! let ids = HomogeneousSequence::new(Some(Arc::new(Type::integer()))).min_length(1);
//!
//! let value = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
//! assert!(ids.is_valid(&value));
//!
//! let err = ids.validate(&Value::List(vec![Value::from("x")]), true).unwrap_err();
//! assert_eq!(err.to_string(), r#"Invalid value "x" (string): must be integer (at 0)"#);
//! ```

pub mod combinators;
pub mod containers;
pub mod engine;
pub mod enumeration;
pub mod error;
pub mod reporter;
pub mod rules;
pub mod types;

// Re-export main types
pub use combinators::{AllOf, AnyOf, ChainOf, DefaultValue, NonNullable, Nullable};
pub use containers::{Additional, HeterogeneousSequence, HomogeneousSequence, Mapping, Object};
pub use engine::{Nullability, ValidationMode, Validator, ValidatorRef};
pub use enumeration::Enum;
pub use error::{AggregateError, ErrorFormat, PathSegment, ValidationError};
pub use reporter::{ValidationIssue, ValidationReport, ValidationReporter};
pub use rules::{AdaptBy, AdaptTo, AdaptorFn, Condition, Pattern, PredicateFn, Range, Text, Traps};
pub use types::{Type, TypeClass};

use thiserror::Error;

/// Outcome of a failed validation
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The value is invalid
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Several independent failures collected by a full validation pass
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A predicate or adaptor failed with an error it was not configured to trap
    #[error("Unhandled fault: {0}")]
    Fault(#[from] valida_value::Error),
}

impl Error {
    /// Record the key or index of an enclosing container
    ///
    /// Faults are not positional and pass through unchanged.
    #[must_use]
    pub fn with_context(self, segment: impl Into<PathSegment>) -> Self {
        match self {
            Error::Invalid(err) => Error::Invalid(err.with_context(segment)),
            Error::Aggregate(mut agg) => {
                agg.add_context(segment);
                Error::Aggregate(agg)
            }
            fault @ Error::Fault(_) => fault,
        }
    }

    /// Whether this is an ordinary validation failure rather than a fault
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        !matches!(self, Error::Fault(_))
    }

    /// The individual validation failures carried by this error
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Error::Invalid(err) => std::slice::from_ref(err),
            Error::Aggregate(agg) => agg.errors(),
            Error::Fault(_) => &[],
        }
    }

    /// The bare failure reasons, without value or context
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Error::Fault(fault) => fault.to_string(),
            _ => self
                .errors()
                .iter()
                .map(ValidationError::message)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Render using custom type names and value representation
    #[must_use]
    pub fn render(&self, format: &ErrorFormat) -> String {
        match self {
            Error::Invalid(err) => err.render(format),
            Error::Aggregate(agg) => agg.render(format),
            Error::Fault(fault) => format!("Unhandled fault: {fault}"),
        }
    }
}

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use valida_value::Value;

    #[test]
    fn test_context_skips_faults() {
        let fault = Error::Fault(valida_value::Error::custom(
            valida_value::ErrorKind::Other,
            "boom",
        ));
        let fault = fault.with_context("foo");
        assert!(!fault.is_invalid());
        assert!(fault.errors().is_empty());

        let invalid = Error::from(ValidationError::invalid("must be integer", &Value::Null))
            .with_context("foo");
        assert_eq!(invalid.errors()[0].path(), vec![&PathSegment::from("foo")]);
    }

    #[test]
    fn test_summary_joins_messages() {
        let err = Error::Aggregate(AggregateError::new([
            ValidationError::new("must be integer"),
            ValidationError::new("must be string"),
        ]));
        assert_eq!(err.summary(), "must be integer; must be string");
    }
}
