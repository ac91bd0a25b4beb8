//! Data Graph Values
//!
//! A [`Value`] is what a reactive cell holds: a primitive, an opaque list,
//! or an instrumented nested mapping.

use std::fmt;
use std::sync::Arc;

use serde_json::Number;

use super::object::ReactiveObject;

/// A value stored in the data graph.
///
/// Equality is primitive equality for scalars and identity for lists and
/// mappings: two distinct mappings with the same contents are not equal.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Lists are carried as-is; their elements are not instrumented.
    List(Arc<Vec<serde_json::Value>>),
    Object(ReactiveObject),
}

impl Value {
    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "mapping",
        }
    }

    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The text a render function writes for this value.
    pub fn to_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(object) => object.to_json().to_string(),
        }
    }

    /// Untracked snapshot of this value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.as_ref().clone()),
            Value::Object(object) => object.to_json(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => write!(f, "List(len={})", items.len()),
            Value::Object(object) => write!(f, "Object({:?})", object.keys()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl From<serde_json::Value> for Value {
    /// Nested mappings are instrumented, innermost first.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(Arc::new(items)),
            serde_json::Value::Object(map) => Value::Object(ReactiveObject::observe(map)),
        }
    }
}

impl From<ReactiveObject> for Value {
    fn from(object: ReactiveObject) -> Self {
        Value::Object(object)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_compare_by_value() {
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_eq!(Value::from(3), Value::from(3i64));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn mappings_compare_by_identity() {
        let a = Value::from(json!({ "x": 1 }));
        let b = Value::from(json!({ "x": 1 }));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn display_matches_rendered_text() {
        assert_eq!(Value::Null.to_display(), "");
        assert_eq!(Value::from(1.5).to_display(), "1.5");
        assert_eq!(Value::from(json!(["a", 2, null])).to_display(), "a,2,");
        assert_eq!(Value::from(json!({ "n": "A" })).to_display(), r#"{"n":"A"}"#);
    }

    #[test]
    fn json_round_trip_preserves_nesting() {
        let source = json!({ "user": { "name": "A", "tags": ["x"] }, "ok": true });
        assert_eq!(Value::from(source.clone()).to_json(), source);
    }
}
