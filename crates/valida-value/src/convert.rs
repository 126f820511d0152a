//! Conversions between value kinds
//!
//! These play the role of "calling the target type's constructor" for
//! adapting validators: each conversion either produces a value of the
//! requested kind or fails with a classified [`Error`].

use crate::map::Map;
use crate::value::{Value, ValueKind};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// 2^63, the first float that no longer fits an i64
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    /// Convert to a value of the given concrete kind
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be represented as `kind`.
    pub fn convert(&self, kind: ValueKind) -> Result<Value> {
        match kind {
            ValueKind::Null => Ok(Value::Null),
            ValueKind::Bool => Ok(self.to_boolean()),
            ValueKind::Integer => self.to_integer(),
            ValueKind::Float => self.to_float(),
            ValueKind::String => Ok(self.to_text()),
            ValueKind::Bytes => self.to_bytes(),
            ValueKind::Date => self.to_date(),
            ValueKind::Time => self.to_time(),
            ValueKind::DateTime => self.to_datetime(),
            ValueKind::List => self.to_items().map(Value::List),
            ValueKind::Tuple => self.to_items().map(Value::Tuple),
            ValueKind::Map => self.to_map(),
        }
    }

    /// Convert to an integer, truncating floats toward zero
    ///
    /// # Errors
    ///
    /// Returns a value error for unparsable strings and NaN, an overflow
    /// error for infinite or out-of-range floats and a type error for
    /// non-numeric kinds.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_integer(&self) -> Result<Value> {
        match self {
            Value::Integer(_) => Ok(self.clone()),
            Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
            Value::Float(x) if x.is_nan() => Err(Error::invalid_literal("integer", self)),
            Value::Float(x) => {
                let truncated = x.trunc();
                if !truncated.is_finite() || truncated < -I64_UPPER || truncated >= I64_UPPER {
                    return Err(Error::out_of_range("integer", self));
                }
                Ok(Value::Integer(truncated as i64))
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| Error::invalid_literal("integer", self)),
            _ => Err(Error::type_mismatch("string or number", self)),
        }
    }

    /// Convert to a float
    ///
    /// # Errors
    ///
    /// Returns a value error for unparsable strings and a type error for
    /// non-numeric kinds.
    pub fn to_float(&self) -> Result<Value> {
        match self {
            Value::Float(_) => Ok(self.clone()),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Integer(_) => Ok(Value::Float(self.as_f64().unwrap_or_default())),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| Error::invalid_literal("float", self)),
            _ => Err(Error::type_mismatch("string or number", self)),
        }
    }

    /// Truthiness of the value
    #[must_use]
    pub fn to_boolean(&self) -> Value {
        let truthy = match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => true,
        };
        Value::Bool(truthy)
    }

    /// Textual form; strings pass through unquoted
    #[must_use]
    pub fn to_text(&self) -> Value {
        match self {
            Value::String(_) => self.clone(),
            other => Value::String(other.to_string()),
        }
    }

    /// Convert to raw bytes
    ///
    /// # Errors
    ///
    /// Returns an overflow error for sequence items outside `0..=255` and a
    /// type error for other kinds.
    pub fn to_bytes(&self) -> Result<Value> {
        match self {
            Value::Bytes(_) => Ok(self.clone()),
            Value::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
            Value::List(items) | Value::Tuple(items) => items
                .iter()
                .map(|item| match item {
                    Value::Integer(i) => u8::try_from(*i).map_err(|_| Error::out_of_range("byte", item)),
                    other => Err(Error::type_mismatch("integer", other)),
                })
                .collect::<Result<Vec<u8>>>()
                .map(Value::Bytes),
            _ => Err(Error::type_mismatch("string, bytes or sequence", self)),
        }
    }

    /// Items of an iterable value: sequences, string characters, bytes or map keys
    ///
    /// # Errors
    ///
    /// Returns a type error for non-iterable kinds.
    pub fn to_items(&self) -> Result<Vec<Value>> {
        match self {
            Value::List(items) | Value::Tuple(items) => Ok(items.clone()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
            Value::Bytes(b) => Ok(b.iter().map(|byte| Value::Integer(i64::from(*byte))).collect()),
            Value::Map(map) => Ok(map.keys().cloned().collect()),
            _ => Err(Error::type_mismatch("iterable", self)),
        }
    }

    /// Convert to a map; sequences must hold `(key, value)` pairs
    ///
    /// # Errors
    ///
    /// Returns a value error for items that are not two-element sequences and
    /// a type error for non-mapping kinds.
    pub fn to_map(&self) -> Result<Value> {
        match self {
            Value::Map(_) => Ok(self.clone()),
            Value::List(items) | Value::Tuple(items) => items
                .iter()
                .map(|item| match item.as_sequence() {
                    Some([k, v]) => Ok((k.clone(), v.clone())),
                    _ => Err(Error::invalid_literal("map entry", item)),
                })
                .collect::<Result<Map>>()
                .map(Value::Map),
            _ => Err(Error::type_mismatch("map or sequence of pairs", self)),
        }
    }

    /// Convert to a date; datetimes drop their time of day
    ///
    /// # Errors
    ///
    /// Returns a value error for non-ISO strings and a type error for other kinds.
    pub fn to_date(&self) -> Result<Value> {
        match self {
            Value::Date(_) => Ok(self.clone()),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            Value::String(s) => s
                .trim()
                .parse::<NaiveDate>()
                .map(Value::Date)
                .map_err(|_| Error::invalid_literal("date", self)),
            _ => Err(Error::type_mismatch("string or date", self)),
        }
    }

    /// Convert to a time of day
    ///
    /// # Errors
    ///
    /// Returns a value error for non-ISO strings and a type error for other kinds.
    pub fn to_time(&self) -> Result<Value> {
        match self {
            Value::Time(_) => Ok(self.clone()),
            Value::DateTime(dt) => Ok(Value::Time(dt.time())),
            Value::String(s) => s
                .trim()
                .parse::<NaiveTime>()
                .map(Value::Time)
                .map_err(|_| Error::invalid_literal("time", self)),
            _ => Err(Error::type_mismatch("string or time", self)),
        }
    }

    /// Convert to a datetime; dates become midnight
    ///
    /// # Errors
    ///
    /// Returns a value error for non-ISO strings and a type error for other kinds.
    pub fn to_datetime(&self) -> Result<Value> {
        match self {
            Value::DateTime(_) => Ok(self.clone()),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::default()))),
            Value::String(s) => s
                .trim()
                .parse::<NaiveDateTime>()
                .map(Value::DateTime)
                .map_err(|_| Error::invalid_literal("datetime", self)),
            _ => Err(Error::type_mismatch("string, date or datetime", self)),
        }
    }
}
