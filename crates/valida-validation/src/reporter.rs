//! Validation reporter

use crate::engine::Validator;
use crate::error::{ErrorFormat, PathSegment, ValidationError};
use crate::Error;
use serde::Serialize;
use valida_value::Value;

/// One reported failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Bare failure reason
    pub message: String,
    /// Location of the failure, outermost first
    pub path: Vec<serde_json::Value>,
    /// Offending value, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Full rendered message
    pub rendered: String,
}

/// Serializable summary of a validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

fn segment_to_json(segment: &PathSegment) -> serde_json::Value {
    match segment {
        PathSegment::Key(key) => key.to_json(),
        PathSegment::Index(idx) => serde_json::Value::from(*idx),
    }
}

/// Reports validation results
#[derive(Debug, Clone, Default)]
pub struct ValidationReporter {
    format: ErrorFormat,
}

impl ValidationReporter {
    /// Create a new validation reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render messages with a custom format
    #[must_use]
    pub fn with_format(format: ErrorFormat) -> Self {
        Self { format }
    }

    /// Run a full, non-adapting validation and report every failure
    pub fn check(&self, validator: &dyn Validator, value: &Value) -> ValidationReport {
        match validator.full_validate(value, false) {
            Ok(_) => ValidationReport::valid(),
            Err(err) => self.report(&err),
        }
    }

    /// Build a report from a failed validation
    #[must_use]
    pub fn report(&self, error: &Error) -> ValidationReport {
        let issues = match error {
            Error::Fault(fault) => vec![ValidationIssue {
                message: fault.to_string(),
                path: Vec::new(),
                value: None,
                rendered: error.render(&self.format),
            }],
            _ => error.errors().iter().map(|e| self.issue(e)).collect(),
        };
        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    fn issue(&self, error: &ValidationError) -> ValidationIssue {
        ValidationIssue {
            message: error.message().to_string(),
            path: error.path().into_iter().map(segment_to_json).collect(),
            value: error.value().map(Value::to_json),
            rendered: error.render(&self.format),
        }
    }
}
