//! Conversions between [`Value`] and `serde_json::Value`

use crate::map::Map;
use crate::value::Value;
use serde_json::Number;

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_to_value(n),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .iter()
                    .map(|(k, v)| (Value::String(k.clone()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

fn number_to_value(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Integer(i),
        None => n.as_f64().map_or(Value::Null, Value::Float),
    }
}

impl Value {
    /// Render this value as JSON
    ///
    /// Tuples become arrays, non-string map keys use their display form,
    /// dates and times become ISO-8601 strings and non-finite floats become null.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(x) => {
                Number::from_f64(*x).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => {
                serde_json::Value::Array(b.iter().map(|byte| (*byte).into()).collect())
            }
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::Time(t) => serde_json::Value::String(t.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::List(items) | Value::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(map_to_json(map)),
        }
    }
}

fn map_to_json(map: &Map) -> serde_json::Map<String, serde_json::Value> {
    map.iter()
        .map(|(k, v)| {
            let key = match k {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key, v.to_json())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"id": 1, "score": 2.5, "tags": ["a"], "gone": null}));
        let map = value.as_map().unwrap();

        assert_eq!(map.get_str("id"), Some(&Value::Integer(1)));
        assert_eq!(map.get_str("score"), Some(&Value::Float(2.5)));
        assert_eq!(map.get_str("tags"), Some(&Value::List(vec![Value::from("a")])));
        assert_eq!(map.get_str("gone"), Some(&Value::Null));
    }

    #[test]
    fn test_to_json() {
        let mut map = Map::new();
        map.insert(5, Value::Tuple(vec![Value::from("x"), Value::Float(f64::NAN)]));
        map.insert(
            "day",
            chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );

        assert_eq!(
            Value::Map(map).to_json(),
            json!({"5": ["x", null], "day": "2024-01-15"})
        );
    }

    #[test]
    fn test_json_round_trip_keeps_shape() {
        let original = json!({"foo": 3, "bar": [1, "2", 3]});
        assert_eq!(Value::from(&original).to_json(), original);
    }
}
