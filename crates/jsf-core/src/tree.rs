// Navigation helpers over serde_json::Value.
// - Read path never creates nodes: `child`, `element`, `resolve`.
// - Write path creates what is missing, the way an indexing write on a
//   generic JSON node does: `child_or_insert`, `element_or_insert`,
//   `resolve_or_insert`. A node of the wrong kind is replaced.
use serde_json::{Map, Value};

use crate::cursor::PathSeg;

/// Kind of container a scope opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
}

impl NodeKind {
    pub fn empty(self) -> Value {
        match self {
            NodeKind::Object => Value::Object(Map::new()),
            NodeKind::Array => Value::Array(Vec::new()),
        }
    }
}

pub fn child<'v>(node: &'v Value, key: &str) -> Option<&'v Value> {
    node.as_object()?.get(key)
}

pub fn element(node: &Value, index: usize) -> Option<&Value> {
    node.as_array()?.get(index)
}

pub fn child_or_insert<'v>(node: &'v mut Value, key: &str) -> &'v mut Value {
    match node {
        Value::Object(map) => map.entry(key).or_insert(Value::Null),
        other => {
            *other = Value::Object(Map::new());
            child_or_insert(other, key)
        }
    }
}

pub fn element_or_insert(node: &mut Value, index: usize) -> &mut Value {
    match node {
        Value::Array(items) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        other => {
            *other = Value::Array(Vec::new());
            element_or_insert(other, index)
        }
    }
}

pub fn resolve<'v>(root: &'v Value, path: &[PathSeg]) -> Option<&'v Value> {
    path.iter().try_fold(root, |node, seg| match seg {
        PathSeg::Key(k) => child(node, k),
        PathSeg::Index(i) => element(node, *i),
    })
}

pub fn resolve_or_insert<'v>(root: &'v mut Value, path: &[PathSeg]) -> &'v mut Value {
    path.iter().fold(root, |node, seg| match seg {
        PathSeg::Key(k) => child_or_insert(node, k),
        PathSeg::Index(i) => element_or_insert(node, *i),
    })
}

/// Number scalar for `v`; integral values are stored as integers so the
/// output stays free of `.0` suffixes. Non-finite values become null.
pub fn number(v: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if v.fract() == 0.0 && v.abs() < EXACT {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_path_creates_missing_nodes() {
        let mut root = Value::Null;
        let path = [PathSeg::key("a"), PathSeg::Index(2), PathSeg::key("b")];
        *resolve_or_insert(&mut root, &path) = json!(7);
        assert_eq!(root, json!({"a": [null, null, {"b": 7}]}));
        assert_eq!(resolve(&root, &path), Some(&json!(7)));
    }

    #[test]
    fn read_path_does_not_create() {
        let root = json!({"a": 1});
        assert!(resolve(&root, &[PathSeg::key("a"), PathSeg::key("b")]).is_none());
        assert!(resolve(&root, &[PathSeg::key("z")]).is_none());
        assert_eq!(root, json!({"a": 1}));
    }

    #[test]
    fn wrong_kind_is_replaced_on_write() {
        let mut root = json!({"a": "text"});
        *child_or_insert(child_or_insert(&mut root, "a"), "b") = json!(true);
        assert_eq!(root, json!({"a": {"b": true}}));
    }

    #[test]
    fn numbers_keep_integers_integral() {
        assert_eq!(number(3.0), json!(3));
        assert_eq!(number(-2.0), json!(-2));
        assert_eq!(number(0.5), json!(0.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }
}
