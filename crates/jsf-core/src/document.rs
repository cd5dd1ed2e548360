// JSON document helpers around a serialization pass.
// - Files: `load_json`, `save_json` (pretty or compact via `SaveOptions`).
// - Passes: `write_with` builds a fresh tree, `read_with` reads an existing one.
// - `remove_field` drops a field so a rewrite does not leave stale parts behind.
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cursor::{Cursor, PathSeg};
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::resolver::IdentifierResolver;
use crate::tree;
use crate::writer::Writer;

#[derive(Clone, Copy, Debug)]
pub struct SaveOptions {
    pub pretty: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

pub fn load_json(path: &Path) -> Result<Value> {
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_json(path: &Path, value: &Value, opts: &SaveOptions) -> Result<()> {
    let json = |source| Error::Json {
        path: path.to_path_buf(),
        source,
    };
    let mut s = if opts.pretty {
        serde_json::to_string_pretty(value).map_err(json)?
    } else {
        serde_json::to_string(value).map_err(json)?
    };
    s.push('\n');
    fs::write(path, s).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "saved json document");
    Ok(())
}

/// Runs a writing pass over a fresh object and returns it.
pub fn write_with(
    resolver: Option<Rc<dyn IdentifierResolver>>,
    pass: impl FnOnce(&mut Writer<'_>),
) -> Value {
    let mut root = Value::Object(Map::new());
    let mut writer = Writer::new(&mut root);
    if let Some(r) = resolver {
        writer = writer.with_resolver(r);
    }
    pass(&mut writer);
    root
}

/// Runs a reading pass over `root`.
pub fn read_with<R>(
    root: &Value,
    resolver: Option<Rc<dyn IdentifierResolver>>,
    pass: impl FnOnce(&mut Reader<'_>) -> R,
) -> R {
    let mut reader = Reader::new(root);
    if let Some(r) = resolver {
        reader = reader.with_resolver(r);
    }
    pass(&mut reader)
}

/// Removes `field` from the object at `path` and returns whether it existed.
/// A missing object along `path` is not an error; a non-object at `path` is.
pub fn remove_field(root: &mut Value, path: &[&str], field: &str) -> Result<bool> {
    let mut cursor = Cursor::new();
    for key in path {
        cursor.push(PathSeg::key(key));
    }
    let pointer = cursor.to_string();
    match root.pointer_mut(&pointer) {
        None => Ok(false),
        Some(Value::Object(map)) => Ok(map.remove(field).is_some()),
        Some(_) => Err(Error::NotAnObject(pointer)),
    }
}

/// Object at `path`, if every step exists.
pub fn object_at<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Map<String, Value>> {
    path.iter()
        .try_fold(root, |node, key| tree::child(node, key))?
        .as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remove_field_paths() {
        let mut v = json!({"a": {"b": {"x": 1, "y": 2}}, "s": "str"});
        assert!(remove_field(&mut v, &["a", "b"], "x").unwrap());
        assert!(!remove_field(&mut v, &["a", "b"], "x").unwrap());
        assert!(!remove_field(&mut v, &["a", "zz"], "x").unwrap());
        assert!(remove_field(&mut v, &["s"], "x").is_err());
        assert_eq!(v, json!({"a": {"b": {"y": 2}}, "s": "str"}));
    }

    #[test]
    fn object_lookup() {
        let v = json!({"a": {"b": {}}});
        assert!(object_at(&v, &["a", "b"]).is_some());
        assert!(object_at(&v, &["a", "c"]).is_none());
        assert!(object_at(&v, &[]).is_some());
    }
}
