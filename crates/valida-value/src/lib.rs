#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # valida-value
//!
//! Runtime value model validated and adapted by the Valida engine.
//!
//! Values are owned trees mirroring what a dynamic runtime hands to a
//! validator: scalars, dates, two concrete sequence kinds (list and tuple),
//! and insertion-ordered mappings with arbitrary keys.

/// Conversions between value kinds, used by adapting validators.
pub mod convert;
/// Bridging to and from `serde_json` values.
pub mod json;
/// Insertion-ordered mapping with value keys.
pub mod map;
/// Core value enum and kind tags.
pub mod value;

/// Mapping type stored inside [`Value::Map`] and its hashable key projection.
pub use map::{HashKey, Map};
/// Value primitives.
pub use value::{Value, ValueKind};

use thiserror::Error;

/// Classification of a conversion failure, used to decide whether a
/// validator traps it or lets it propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input has a kind the operation does not accept at all.
    Type,
    /// The input has an acceptable kind but an unusable content.
    Value,
    /// The input does not fit the target representation.
    Overflow,
    /// Any other failure raised by user code.
    Other,
}

/// Errors raised while converting or inspecting values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid literal for {target}: {literal}")]
    InvalidLiteral { target: String, literal: String },

    #[error("{value} is out of range for {target}")]
    OutOfRange { target: String, value: String },

    #[error("{message}")]
    Custom { kind: ErrorKind, message: String },
}

impl Error {
    /// Build a type-mismatch error from the expected description and the offending value.
    pub fn type_mismatch(expected: impl Into<String>, found: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.kind().name().to_string(),
        }
    }

    /// Build an invalid-literal error for a conversion target.
    pub fn invalid_literal(target: impl Into<String>, literal: &Value) -> Self {
        Self::InvalidLiteral {
            target: target.into(),
            literal: literal.to_string(),
        }
    }

    /// Build an out-of-range error for a conversion target.
    pub fn out_of_range(target: impl Into<String>, value: &Value) -> Self {
        Self::OutOfRange {
            target: target.into(),
            value: value.to_string(),
        }
    }

    /// Build a free-form error of the given kind, typically from user predicates.
    pub fn custom(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Custom {
            kind,
            message: message.into(),
        }
    }

    /// Classification used for trap matching.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::InvalidLiteral { .. } => ErrorKind::Value,
            Self::OutOfRange { .. } => ErrorKind::Overflow,
            Self::Custom { kind, .. } => *kind,
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
