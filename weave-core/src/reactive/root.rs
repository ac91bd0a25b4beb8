//! Reactive Root
//!
//! The root is the bound view's accessor surface. It owns a handle to the
//! instrumented data mapping and proxies the top-level keys that existed
//! when the view was bound; expression paths resolve through those proxies
//! and then descend cell by cell.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::error::{Error, Result};

use super::cell::ReactiveCell;
use super::object::ReactiveObject;
use super::path::ExpressionPath;
use super::value::Value;

/// Proxied accessors over an instrumented data graph. Cloning shares it.
#[derive(Clone, Debug)]
pub struct ReactiveRoot {
    data: ReactiveObject,
    proxied: Arc<IndexSet<String>>,
}

impl ReactiveRoot {
    /// Bind accessors for every top-level key currently in `data`.
    pub fn new(data: ReactiveObject) -> Self {
        let proxied = data.keys().into_iter().collect();
        Self {
            data,
            proxied: Arc::new(proxied),
        }
    }

    /// The raw data object. It aliases the state behind every accessor.
    pub fn data(&self) -> ReactiveObject {
        self.data.clone()
    }

    /// Top-level keys that have accessors.
    pub fn proxied_keys(&self) -> impl Iterator<Item = &str> {
        self.proxied.iter().map(String::as_str)
    }

    /// Resolve `path` by sequential descent. Every cell on the way is read
    /// with tracking, so a recording subscription depends on all of them.
    pub fn get(&self, path: &ExpressionPath) -> Result<Value> {
        let (parents, last) = path.split_last();
        let parent = self.parent(path, parents)?;
        lookup(&parent, path, last)
    }

    /// Write `value` at `path`. Returns whether the value changed.
    ///
    /// The parent is resolved like [`get`](Self::get); the last key must
    /// already exist.
    pub fn set(&self, path: &ExpressionPath, value: impl Into<Value>) -> Result<bool> {
        let (parents, last) = path.split_last();
        let parent = self.parent(path, parents)?;

        parent.set(last, value).ok_or_else(|| Error::UnresolvedPath {
            path: path.to_string(),
            segment: last.to_owned(),
        })
    }

    /// The cell that holds the value at `path`.
    pub fn cell(&self, path: &ExpressionPath) -> Result<ReactiveCell> {
        let (parents, last) = path.split_last();
        self.parent(path, parents)?
            .cell(last)
            .ok_or_else(|| Error::UnresolvedPath {
                path: path.to_string(),
                segment: last.to_owned(),
            })
    }

    /// Convenience for [`get`](Self::get) with an unparsed expression.
    pub fn read(&self, expression: &str) -> Result<Value> {
        self.get(&expression.parse()?)
    }

    /// Convenience for [`set`](Self::set) with an unparsed expression.
    pub fn write(&self, expression: &str, value: impl Into<Value>) -> Result<bool> {
        self.set(&expression.parse()?, value)
    }

    /// Walk the proxied root and every intermediate segment.
    fn parent(&self, path: &ExpressionPath, parents: &[String]) -> Result<ReactiveObject> {
        if !self.proxied.contains(path.root()) {
            return Err(Error::UnresolvedPath {
                path: path.to_string(),
                segment: path.root().to_owned(),
            });
        }

        let mut current = self.data.clone();
        for segment in parents {
            current = descend(path, segment, lookup(&current, path, segment)?)?;
        }
        Ok(current)
    }
}

fn lookup(object: &ReactiveObject, path: &ExpressionPath, segment: &str) -> Result<Value> {
    object.get(segment).ok_or_else(|| Error::UnresolvedPath {
        path: path.to_string(),
        segment: segment.to_owned(),
    })
}

fn descend(path: &ExpressionPath, segment: &str, value: Value) -> Result<ReactiveObject> {
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(Error::NotAMapping {
            path: path.to_string(),
            segment: segment.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root(value: serde_json::Value) -> ReactiveRoot {
        let Value::Object(data) = Value::from(value) else {
            panic!("fixture must be a mapping")
        };
        ReactiveRoot::new(data)
    }

    #[test]
    fn resolves_top_level_and_nested_paths() {
        let root = root(json!({ "msg": "hi", "user": { "name": "A" } }));
        assert_eq!(root.read("msg").unwrap(), Value::from("hi"));
        assert_eq!(root.read("user.name").unwrap(), Value::from("A"));
    }

    #[test]
    fn proxied_keys_keep_source_order() {
        let root = root(json!({ "zeta": 1, "alpha": 2, "mid": { "y": 1, "x": 2 } }));
        assert_eq!(root.proxied_keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);

        let mid = root.read("mid").unwrap();
        assert_eq!(mid.as_object().unwrap().keys(), vec!["y", "x"]);
    }

    #[test]
    fn missing_root_key_is_an_error() {
        let root = root(json!({ "msg": "hi" }));
        match root.read("nope.x") {
            Err(Error::UnresolvedPath { segment, .. }) => assert_eq!(segment, "nope"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn descending_through_a_primitive_is_an_error() {
        let root = root(json!({ "msg": "hi" }));
        assert!(matches!(root.read("msg.len"), Err(Error::NotAMapping { .. })));
    }

    #[test]
    fn writes_alias_the_raw_data() {
        let root = root(json!({ "user": { "name": "A" } }));
        assert!(root.write("user.name", "B").unwrap());
        assert!(!root.write("user.name", "B").unwrap());

        let raw = root.data();
        let user = raw.get("user").unwrap();
        assert_eq!(user.as_object().unwrap().get("name"), Some(Value::from("B")));
    }

    #[test]
    fn keys_added_after_binding_have_no_accessor() {
        let root = root(json!({ "a": 1 }));
        root.data().insert("late", 2);

        assert!(matches!(root.read("late"), Err(Error::UnresolvedPath { .. })));
        assert_eq!(root.data().get("late"), Some(Value::from(2)));
    }

    #[test]
    fn cell_lookup_follows_the_path() {
        let root = root(json!({ "user": { "name": "A" } }));
        let cell = root.cell(&"user.name".parse().unwrap()).unwrap();
        assert_eq!(cell.key(), "name");

        root.write("user.name", "B").unwrap();
        assert_eq!(cell.get_untracked(), Value::from("B"));
    }

    #[test]
    fn writing_a_missing_leaf_is_an_error() {
        let root = root(json!({ "user": {} }));
        assert!(matches!(root.write("user.name", "x"), Err(Error::UnresolvedPath { .. })));
    }
}
