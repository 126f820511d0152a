#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # valida-schema
//!
//! Compiles schema descriptors into validators.
//!
//! A descriptor is plain data: a registered name such as `"integer"`, a
//! `?`/`+` prefixed name for nullable or non-nullable values, an object
//! literal of property descriptors, a list or tuple literal, a regex, a type
//! class, a predicate or an already built validator. The [`Compiler`] owns
//! the named-validator registry and the factory chain, and resolves
//! descriptors under an immutable [`CompileContext`] that carries the default
//! required/additional property policy for object literals.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use valida_schema::{Compiler, Descriptor};
//! use valida_validation::Validator;
//! use valida_value::Value;
//!
//! let compiler = Compiler::new();
//! let schema = Descriptor::from(&json!({"+foo": "number", "?bar": ["integer"]}));
//! let validator = compiler.compile(&schema).unwrap();
//!
//! let value = Value::from(json!({"foo": 3, "bar": [1, "2", 3]}));
//! let err = validator.validate(&value, true).unwrap_err();
//! assert_eq!(err.to_string(), r#"Invalid value "2" (string): must be integer (at bar[1])"#);
//! ```

pub mod builtins;
pub mod compiler;
pub mod context;
pub mod descriptor;
pub mod options;
pub mod registry;

pub use compiler::{Compiler, Factory, Scope};
pub use context::{AdditionalProperties, CompileContext, ContextOverrides};
pub use descriptor::Descriptor;
pub use options::{AdditionalPropertiesOption, CompileOptions};
pub use registry::{Registered, Registry};

use thiserror::Error;
use valida_validation::ValidatorRef;

/// Errors that can occur when compiling descriptors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Invalid compile options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile a descriptor with a default compiler
///
/// # Errors
///
/// Returns [`Error::Schema`] if the descriptor cannot be resolved.
pub fn compile(descriptor: &Descriptor) -> Result<ValidatorRef> {
    Compiler::new().compile(descriptor)
}
