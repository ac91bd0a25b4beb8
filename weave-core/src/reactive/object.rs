//! Instrumented Mappings
//!
//! A [`ReactiveObject`] is a mapping of property names to reactive cells.
//! Instrumenting data replaces plain storage with cells in place: every
//! handle to the object (the view's and the caller's) sees the same state.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::cell::ReactiveCell;
use super::value::Value;

/// An instrumented mapping. Cloning shares it.
#[derive(Clone, Default)]
pub struct ReactiveObject {
    cells: Arc<RwLock<IndexMap<String, ReactiveCell>>>,
}

impl ReactiveObject {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instrument a nested data mapping.
    ///
    /// Mapping-valued entries are instrumented first, so nested structures
    /// are complete before their parent cell wraps them. Every key at every
    /// level gets its own cell.
    pub fn observe(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let cells = map
            .into_iter()
            .map(|(key, value)| {
                let value = Value::from(value);
                let cell = ReactiveCell::new(key.clone(), value);
                (key, cell)
            })
            .collect();

        Self {
            cells: Arc::new(RwLock::new(cells)),
        }
    }

    /// The cell for `key`, if the key exists.
    pub fn cell(&self, key: &str) -> Option<ReactiveCell> {
        self.cells.read().get(key).cloned()
    }

    /// Tracked read of `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        // The map lock is released before the cell read runs.
        self.cell(key).map(|cell| cell.get())
    }

    /// Write `key` through its cell. Returns `None` if the key does not exist,
    /// otherwise whether the value changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Option<bool> {
        self.cell(key).map(|cell| cell.set(value.into()))
    }

    /// Install a new cell for `key`, replacing any previous cell.
    ///
    /// Subscribers of a replaced cell stay attached to the old cell.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> ReactiveCell {
        let key = key.into();
        let cell = ReactiveCell::new(key.clone(), value.into());
        self.cells.write().insert(key, cell.clone());
        cell
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cells.read().contains_key(key)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.cells.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    /// Untracked snapshot of the whole mapping.
    pub fn to_json(&self) -> serde_json::Value {
        let cells: Vec<ReactiveCell> = self.cells.read().values().cloned().collect();
        let map = cells
            .into_iter()
            .map(|cell| (cell.key().to_owned(), cell.get_untracked().to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observe(value: serde_json::Value) -> ReactiveObject {
        match Value::from(value) {
            Value::Object(object) => object,
            other => panic!("expected a mapping, got {other:?}"),
        }
    }

    #[test]
    fn every_key_at_every_level_gets_a_cell() {
        let data = observe(json!({ "user": { "name": "A", "address": { "city": "X" } }, "n": 1 }));

        assert_eq!(data.keys(), vec!["user", "n"]);
        let user = data.get("user").unwrap();
        let user = user.as_object().unwrap();
        assert!(user.cell("name").is_some());
        let address = user.get("address").unwrap();
        assert!(address.as_object().unwrap().cell("city").is_some());
    }

    #[test]
    fn handles_alias_one_state() {
        let data = observe(json!({ "msg": "hi" }));
        let alias = data.clone();

        assert_eq!(alias.set("msg", "bye"), Some(true));
        assert_eq!(data.get("msg"), Some(Value::from("bye")));
        assert!(data.ptr_eq(&alias));
    }

    #[test]
    fn set_on_missing_key_reports_none() {
        let data = observe(json!({}));
        assert_eq!(data.set("nope", 1), None);
        assert!(data.is_empty());
    }

    #[test]
    fn snapshot_reflects_writes() {
        let data = observe(json!({ "a": 1, "b": { "c": "x" } }));
        data.get("b").unwrap().as_object().unwrap().set("c", "y");
        assert_eq!(data.to_json(), json!({ "a": 1, "b": { "c": "y" } }));
    }
}
