//! Enumerated value sets

use crate::engine::{ValidationMode, Validator};
use crate::Result;
use std::borrow::Cow;
use std::collections::HashSet;
use valida_value::{HashKey, Value};

/// Accepts only members of a fixed set of values
///
/// Scalars are looked up by hash, everything else by a linear equality scan.
#[derive(Debug, Clone)]
pub struct Enum {
    name: Option<String>,
    values: Vec<Value>,
    hashed: HashSet<HashKey>,
    unhashable: Vec<Value>,
}

impl Enum {
    pub fn new<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let mut hashed = HashSet::new();
        let mut unhashable = Vec::new();
        for value in &values {
            match value.hash_key() {
                Some(key) => {
                    hashed.insert(key);
                }
                None => unhashable.push(value.clone()),
            }
        }
        Self {
            name: None,
            values,
            hashed,
            unhashable,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        match value.hash_key() {
            Some(key) => self.hashed.contains(&key),
            None => self.unhashable.iter().any(|member| member == value),
        }
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Validator for Enum {
    fn check<'v>(&self, value: &'v Value, _mode: ValidationMode) -> Result<Cow<'v, Value>> {
        if self.contains(value) {
            Ok(Cow::Borrowed(value))
        } else {
            Err(self.error(value).into())
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn humanized_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let members: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        format!("one of {{{}}}", members.join(", "))
    }
}
