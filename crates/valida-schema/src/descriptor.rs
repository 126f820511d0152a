//! Uncompiled schema descriptors

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use valida_validation::{PredicateFn, TypeClass, Validator, ValidatorRef};
use valida_value::Value;

/// Raw schema value, turned into a validator by the compiler
///
/// Descriptors are owned trees, so a schema cannot refer to itself;
/// recursive schemas are not supported.
#[derive(Clone)]
pub enum Descriptor {
    /// An already built validator, used as is
    Validator(ValidatorRef),
    /// Builds a default-configured validator on every compile
    Producer(fn() -> ValidatorRef),
    /// A registered name, optionally prefixed with `?` (nullable) or `+` (non-nullable)
    Name(String),
    /// Property name to descriptor; names may carry a `+`/`?` prefix
    Object(Vec<(String, Descriptor)>),
    /// Zero or one item descriptor: a sequence of that item
    List(Vec<Descriptor>),
    /// One descriptor per position of a fixed-length sequence
    Tuple(Vec<Descriptor>),
    Pattern(Regex),
    Type(TypeClass),
    Predicate { label: String, predicate: PredicateFn },
    /// Any other value; never compilable unless a custom factory claims it
    Literal(Value),
}

fn instantiate<T: Validator + Default + 'static>() -> ValidatorRef {
    Arc::new(T::default())
}

impl Descriptor {
    /// Object literal from `(name, descriptor)` pairs
    pub fn object<K, D>(properties: impl IntoIterator<Item = (K, D)>) -> Self
    where
        K: Into<String>,
        D: Into<Descriptor>,
    {
        Descriptor::Object(
            properties
                .into_iter()
                .map(|(name, descriptor)| (name.into(), descriptor.into()))
                .collect(),
        )
    }

    /// Sequence of `item`
    pub fn list(item: impl Into<Descriptor>) -> Self {
        Descriptor::List(vec![item.into()])
    }

    pub fn tuple<D: Into<Descriptor>>(items: impl IntoIterator<Item = D>) -> Self {
        Descriptor::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn predicate(
        label: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Descriptor::Predicate {
            label: label.into(),
            predicate: Arc::new(move |value: &Value| Ok(predicate(value))),
        }
    }

    /// Wrap a built validator
    pub fn validator(validator: impl Validator + 'static) -> Self {
        Descriptor::Validator(Arc::new(validator))
    }

    /// Default-constructed instance of `T` on every compile
    #[must_use]
    pub fn producer<T: Validator + Default + 'static>() -> Self {
        Descriptor::Producer(instantiate::<T>)
    }
}

impl From<&str> for Descriptor {
    fn from(name: &str) -> Self {
        Descriptor::Name(name.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(name: String) -> Self {
        Descriptor::Name(name)
    }
}

impl From<ValidatorRef> for Descriptor {
    fn from(validator: ValidatorRef) -> Self {
        Descriptor::Validator(validator)
    }
}

impl From<TypeClass> for Descriptor {
    fn from(class: TypeClass) -> Self {
        Descriptor::Type(class)
    }
}

impl From<Regex> for Descriptor {
    fn from(regex: Regex) -> Self {
        Descriptor::Pattern(regex)
    }
}

/// JSON strings are names, objects are object literals, arrays of at most
/// one element are lists and longer arrays are tuples
impl From<&serde_json::Value> for Descriptor {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(name) => Descriptor::Name(name.clone()),
            serde_json::Value::Object(fields) => Descriptor::Object(
                fields
                    .iter()
                    .map(|(name, nested)| (name.clone(), Descriptor::from(nested)))
                    .collect(),
            ),
            serde_json::Value::Array(items) if items.len() <= 1 => {
                Descriptor::List(items.iter().map(Descriptor::from).collect())
            }
            serde_json::Value::Array(items) => {
                Descriptor::Tuple(items.iter().map(Descriptor::from).collect())
            }
            other => Descriptor::Literal(Value::from(other)),
        }
    }
}

impl From<serde_json::Value> for Descriptor {
    fn from(json: serde_json::Value) -> Self {
        Descriptor::from(&json)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Descriptor]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Validator(validator) => write!(f, "<{}>", validator.humanized_name()),
            Descriptor::Producer(_) => f.write_str("<producer>"),
            Descriptor::Name(name) => write!(f, "{name:?}"),
            Descriptor::Object(properties) => {
                f.write_str("{")?;
                for (idx, (name, nested)) in properties.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}: {nested}")?;
                }
                f.write_str("}")
            }
            Descriptor::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Descriptor::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Descriptor::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            Descriptor::Type(class) => write!(f, "<type {class}>"),
            Descriptor::Predicate { label, .. } => write!(f, "<predicate {label}>"),
            Descriptor::Literal(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Descriptor({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        let descriptor = Descriptor::from(&json!({
            "+id": "integer",
            "tags": ["string"],
            "any": [],
            "point": ["number", "number"],
            "answer": 42
        }));
        let Descriptor::Object(properties) = descriptor else {
            panic!("expected object literal");
        };
        let find = |name: &str| {
            properties
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, d)| d.clone())
                .unwrap()
        };

        assert!(matches!(find("+id"), Descriptor::Name(n) if n == "integer"));
        assert!(matches!(find("tags"), Descriptor::List(items) if items.len() == 1));
        assert!(matches!(find("any"), Descriptor::List(items) if items.is_empty()));
        assert!(matches!(find("point"), Descriptor::Tuple(items) if items.len() == 2));
        assert!(matches!(find("answer"), Descriptor::Literal(Value::Integer(42))));
    }

    #[test]
    fn test_display() {
        let descriptor = Descriptor::object([
            ("+foo", Descriptor::from("number")),
            ("?bar", Descriptor::list("integer")),
        ]);
        assert_eq!(descriptor.to_string(), r#"{"+foo": "number", "?bar": ["integer"]}"#);
        assert_eq!(
            Descriptor::tuple(["a", "b"]).to_string(),
            r#"("a", "b")"#
        );
        assert_eq!(Descriptor::Literal(Value::Float(1.5)).to_string(), "1.5");
        assert_eq!(Descriptor::from(TypeClass::Bytes).to_string(), "<type bytes>");
    }
}
