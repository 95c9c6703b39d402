//! Record payloads - typed view over backend JSON
//!
//! Backend records are arbitrary JSON objects. Instead of inspecting
//! `serde_json::Value` at render time, payloads are converted once into a
//! closed set of variants so rendering can match exhaustively.
//!
//! Key order is the payload's own order (serde_json is built with
//! `preserve_order`).

use serde_json::{Map, Number, Value as Json};
use std::fmt;

/// A leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A field value inside a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(Scalar),
    /// Arrays are flattened to scalars; nested objects inside arrays
    /// become compact JSON text.
    Sequence(Vec<Scalar>),
    Record(Record),
}

/// Ordered field name -> value mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used mostly by tests and fixtures
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar field as display text; empty when missing or not a scalar
    pub fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::Scalar(s)) => s.to_string(),
            _ => String::new(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert a JSON value that must be an object
    pub fn from_json(json: Json) -> Option<Self> {
        match json {
            Json::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    /// Back to JSON (for clipboard export)
    pub fn to_json(&self) -> Json {
        let map: Map<String, Json> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Json::Object(map)
    }
}

impl From<Map<String, Json>> for Record {
    fn from(map: Map<String, Json>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            Json::Number(n) => Value::Scalar(Scalar::Number(n)),
            Json::String(s) => Value::Scalar(Scalar::Text(s)),
            Json::Array(items) => Value::Sequence(items.into_iter().map(flatten_element).collect()),
            Json::Object(map) => Value::Record(Record::from(map)),
        }
    }
}

fn flatten_element(json: Json) -> Scalar {
    match json {
        Json::Bool(b) => Scalar::Bool(b),
        Json::Number(n) => Scalar::Number(n),
        Json::String(s) => Scalar::Text(s),
        Json::Null => Scalar::Text("null".to_string()),
        other => Scalar::Text(other.to_string()),
    }
}

impl Value {
    /// Shorthand for a text scalar
    pub fn text(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(s.into()))
    }

    fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Scalar(s) => scalar_to_json(s),
            Value::Sequence(items) => Json::Array(items.iter().map(scalar_to_json).collect()),
            Value::Record(r) => r.to_json(),
        }
    }
}

fn scalar_to_json(s: &Scalar) -> Json {
    match s {
        Scalar::Text(t) => Json::String(t.clone()),
        Scalar::Number(n) => Json::Number(n.clone()),
        Scalar::Bool(b) => Json::Bool(*b),
    }
}

/// Field holding a list element that is not an object
pub const VALUE_FIELD: &str = "value";

/// Convert a JSON array into one record per element
///
/// Elements that are not objects are wrapped as `{"value": element}` so
/// the list keeps the length of the response.
pub fn records_from_json(json: Json) -> Option<Vec<Record>> {
    match json {
        Json::Array(items) => Some(items.into_iter().map(element_record).collect()),
        _ => None,
    }
}

fn element_record(json: Json) -> Record {
    match json {
        Json::Object(map) => Record::from(map),
        other => Record::new().with(VALUE_FIELD, Value::from(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_follows_payload() {
        let record = Record::from_json(json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_variants_from_json() {
        let record = Record::from_json(json!({
            "name": "Ada",
            "age": 36,
            "deleted": null,
            "tags": ["a", 2, true],
            "address": {"city": "London"}
        }))
        .unwrap();

        assert_eq!(record.get("name"), Some(&Value::text("Ada")));
        assert_eq!(record.get("deleted"), Some(&Value::Null));
        assert!(matches!(record.get("tags"), Some(Value::Sequence(items)) if items.len() == 3));
        assert!(matches!(record.get("address"), Some(Value::Record(r)) if r.text("city") == "London"));
        assert_eq!(record.text("age"), "36");
    }

    #[test]
    fn test_array_of_objects_flattens_to_json_text() {
        let value = Value::from(json!([{"a": 1}]));
        assert_eq!(
            value,
            Value::Sequence(vec![Scalar::Text("{\"a\":1}".to_string())])
        );
    }

    #[test]
    fn test_non_object_is_not_a_record() {
        assert!(Record::from_json(json!([1, 2])).is_none());
        assert!(Record::from_json(json!("x")).is_none());
    }

    #[test]
    fn test_records_from_json_keeps_every_element() {
        let records = records_from_json(json!([{"cid": "a"}, 3, null, {"cid": "b"}])).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].text(VALUE_FIELD), "3");
        assert_eq!(records[2].get(VALUE_FIELD), Some(&Value::Null));
        assert_eq!(records[3].text("cid"), "b");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new().with("a", Value::Null).with("b", Value::Null);
        record.insert("a", Value::text("x"));
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.text("a"), "x");
    }
}
