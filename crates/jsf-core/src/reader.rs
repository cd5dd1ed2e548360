use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cursor::{Cursor, PathSeg};
use crate::format::Format;
use crate::lic::{ALL_OF, ANY_OF, Lic, LicSet, NONE_OF};
use crate::resolver::{IdentifierResolver, NO_ID, decode_guarded};
use crate::tree::{self, NodeKind};
use crate::tribool::Tribool;

/// Reading pass: fills field values from a tree, falling back to
/// defaults for absent fields. Never modifies the tree.
pub struct Reader<'a> {
    root: &'a Value,
    cursor: Cursor,
    resolver: Option<Rc<dyn IdentifierResolver>>,
}

impl<'a> Reader<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            cursor: Cursor::new(),
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Rc<dyn IdentifierResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn root(&self) -> &Value {
        self.root
    }

    fn field(&self, field: &str) -> Option<&'a Value> {
        tree::child(tree::resolve(self.root, self.cursor.segments())?, field)
    }

    /// Present field of the expected shape; anything else counts as absent.
    fn typed_field<T>(
        &self,
        field: &str,
        get: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Option<T> {
        let node = self.field(field)?;
        let out = get(node);
        if out.is_none() && !node.is_null() {
            debug!(cursor = %self.cursor, field, "unexpected value type; using default");
        }
        out
    }

    fn lic_field(&self, field: &str) -> Option<&'a Value> {
        self.typed_field(field, |v| v.is_object().then_some(v))
    }

    /// Decoded ids of `part`; `None` when the part is absent.
    /// Sentinel ids are dropped: the decoder has reported them already.
    fn lic_part(
        &self,
        node: &'a Value,
        part: &str,
        resolver: &dyn IdentifierResolver,
    ) -> Option<Vec<i32>> {
        let items = tree::child(node, part)?.as_array()?;
        let ids = items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(name) => Some(decode_guarded(resolver, name)),
                None => {
                    debug!(cursor = %self.cursor, part, "non-string condition entry skipped");
                    None
                }
            })
            .filter(|id| *id >= 0)
            .collect();
        Some(ids)
    }
}

/// Sets `flags[id] = on` for every id in range; the rest are logged.
fn apply_ids(flags: &mut [bool], ids: &[i32], on: bool) {
    for &id in ids {
        match flags.get_mut(id as usize) {
            Some(flag) => *flag = on,
            None => error!(id, len = flags.len(), "condition id out of bounds"),
        }
    }
}

fn flags_from(len: usize, ids: &[i32]) -> Vec<bool> {
    let mut flags = vec![false; len];
    apply_ids(&mut flags, ids, true);
    flags
}

impl Format for Reader<'_> {
    fn saving(&self) -> bool {
        false
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn current(&self) -> Option<&Value> {
        tree::resolve(self.root, self.cursor.segments())
    }

    fn ambient_resolver(&self) -> Option<Rc<dyn IdentifierResolver>> {
        self.resolver.clone()
    }

    fn descend(&mut self, seg: PathSeg, _kind: NodeKind) {
        self.cursor.push(seg);
    }

    fn ascend(&mut self, depth: usize) {
        self.cursor.truncate(depth);
    }

    fn resize_array(&mut self, _len: usize) {}

    fn primitive_tribool(&mut self, field: &str, value: &mut Tribool) {
        *value = self
            .typed_field(field, Value::as_bool)
            .map_or(Tribool::Unknown, Tribool::from);
    }

    fn primitive_numeric(&mut self, field: &str, value: &mut f64, default: Option<f64>) {
        if let Some(v) = self.typed_field(field, Value::as_f64).or(default) {
            *value = v;
        }
    }

    fn primitive_enum_string(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        table: &[&str],
    ) {
        match self.typed_field(field, Value::as_str) {
            Some(name) => {
                *value = match table.iter().position(|t| *t == name) {
                    Some(i) => i as i32,
                    None => {
                        warn!(cursor = %self.cursor, field, name, "unknown enum name");
                        NO_ID
                    }
                };
            }
            None => {
                if let Some(d) = default {
                    *value = d;
                }
            }
        }
    }

    fn primitive_identifier(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        resolver: &dyn IdentifierResolver,
    ) {
        match self.typed_field(field, Value::as_str) {
            Some(name) => *value = decode_guarded(resolver, name),
            None => {
                if let Some(d) = default {
                    *value = d;
                }
            }
        }
    }

    fn serialize_string(&mut self, field: &str, value: &mut String) {
        match self.typed_field(field, Value::as_str) {
            Some(s) => *value = s.to_owned(),
            None => value.clear(),
        }
    }

    fn serialize_string_at(&mut self, index: usize, value: &mut String) {
        match self.current().and_then(|n| tree::element(n, index)) {
            Some(Value::String(s)) => value.clone_from(s),
            _ => value.clear(),
        }
    }

    fn serialize_value(&mut self, field: &str, value: &mut Value) {
        if let Some(v) = self.field(field) {
            *value = v.clone();
        }
    }

    fn serialize_lic(
        &mut self,
        field: &str,
        resolver: &dyn IdentifierResolver,
        standard: &[bool],
        value: &mut Vec<bool>,
    ) {
        assert_eq!(
            standard.len(),
            value.len(),
            "condition {:?}: value and standard differ in length",
            field
        );
        let Some(node) = self.lic_field(field) else {
            value.copy_from_slice(standard);
            return;
        };
        let any = self.lic_part(node, ANY_OF, resolver);
        let all = self.lic_part(node, ALL_OF, resolver);
        if any.is_none() && all.is_none() {
            value.copy_from_slice(standard);
        } else {
            value.fill(false);
            for ids in [any, all].iter().flatten() {
                apply_ids(value, ids, true);
            }
        }
        if let Some(ids) = self.lic_part(node, NONE_OF, resolver) {
            apply_ids(value, &ids, false);
        }
    }

    fn serialize_lic_full(
        &mut self,
        field: &str,
        value: &mut Lic,
        resolver: &dyn IdentifierResolver,
    ) {
        let Some(node) = self.lic_field(field) else {
            return;
        };
        let len = value.standard.len();
        value.any = match self.lic_part(node, ANY_OF, resolver) {
            Some(ids) => flags_from(len, &ids),
            None => value.standard.clone(),
        };
        value.all = flags_from(len, &self.lic_part(node, ALL_OF, resolver).unwrap_or_default());
        value.none = flags_from(len, &self.lic_part(node, NONE_OF, resolver).unwrap_or_default());
    }

    fn serialize_lic_set(
        &mut self,
        field: &str,
        value: &mut LicSet,
        resolver: &dyn IdentifierResolver,
    ) {
        let Some(node) = self.lic_field(field) else {
            return;
        };
        let read = |part: &str| -> Option<BTreeSet<i32>> {
            self.lic_part(node, part, resolver)
                .map(|ids| ids.into_iter().collect())
        };
        value.any = read(ANY_OF).unwrap_or_else(|| value.standard.clone());
        value.all = read(ALL_OF).unwrap_or_default();
        value.none = read(NONE_OF).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NameTable;
    use serde_json::json;

    #[test]
    fn absent_fields_take_defaults() {
        let root = json!({});
        let mut r = Reader::new(&root);

        let mut flag = true;
        r.serialize_bool("flag", &mut flag);
        assert!(!flag);

        let mut tri = Tribool::True;
        r.serialize_tribool("tri", &mut tri);
        assert_eq!(tri, Tribool::Unknown);

        let mut n = 9u16;
        r.serialize_numeric_or("n", &mut n, 4);
        assert_eq!(n, 4);

        let mut untouched = 9u16;
        r.serialize_numeric("m", &mut untouched);
        assert_eq!(untouched, 9);

        let mut s = "old".to_string();
        r.serialize_string("s", &mut s);
        assert_eq!(s, "");
    }

    #[test]
    fn present_fields_overwrite() {
        let root = json!({"flag": false, "n": 12, "level": "mid", "s": "hi", "x": 0.25});
        let mut r = Reader::new(&root);

        let mut flag = true;
        r.serialize_bool("flag", &mut flag);
        assert!(!flag);

        let mut n = 0i64;
        r.serialize_numeric_or("n", &mut n, 4);
        assert_eq!(n, 12);

        let mut x = 0f32;
        r.serialize_numeric("x", &mut x);
        assert_eq!(x, 0.25);

        let mut level = 0;
        r.serialize_numeric_enum("level", &["low", "mid"], 0, &mut level);
        assert_eq!(level, 1);

        let mut s = String::new();
        r.serialize_string("s", &mut s);
        assert_eq!(s, "hi");
    }

    #[test]
    fn unknown_names_yield_sentinel() {
        let root = json!({"level": "ultra", "owner": "nobody"});
        let names = NameTable::new("player", ["red", "blue"]);
        let mut r = Reader::new(&root);

        let mut level = 0;
        r.serialize_numeric_enum("level", &["low", "mid"], 0, &mut level);
        assert_eq!(level, NO_ID);

        let mut owner = 1;
        r.serialize_id("owner", &names, NO_ID, &mut owner);
        assert_eq!(owner, NO_ID);
    }

    #[test]
    fn wrong_type_counts_as_absent() {
        let root = json!({"n": "seven", "flag": 1});
        let mut r = Reader::new(&root);
        let mut n = 3;
        r.serialize_numeric_or("n", &mut n, 5);
        assert_eq!(n, 5);
        let mut flag = Tribool::True;
        r.serialize_tribool("flag", &mut flag);
        assert_eq!(flag, Tribool::Unknown);
    }

    #[test]
    fn absent_scope_reads_as_empty() {
        let root = json!({"other": {"n": 1}});
        let mut r = Reader::new(&root);
        let mut n = 0;
        {
            let mut s = r.enter_struct("missing");
            assert!(s.node().is_none());
            s.serialize_numeric_or("n", &mut n, 42);
            let inner = s.enter_array("list");
            assert!(inner.is_empty());
        }
        assert_eq!(n, 42);
        assert!(r.cursor().is_root());
    }

    #[test]
    fn lic_vector_modes() {
        let names = NameTable::new("town", ["a", "b", "c", "d"]);
        let standard = [true, true, true, false];
        let root = json!({
            "permissive": {"noneOf": ["b"]},
            "restrictive": {"anyOf": ["a"], "allOf": ["d"], "noneOf": ["zzz"]},
            "odd": {"anyOf": ["c", 7, "c"]}
        });
        let mut r = Reader::new(&root);

        let mut v = vec![false; 4];
        r.serialize_lic("permissive", &names, &standard, &mut v);
        assert_eq!(v, [true, false, true, false]);

        r.serialize_lic("restrictive", &names, &standard, &mut v);
        assert_eq!(v, [true, false, false, true]);

        r.serialize_lic("odd", &names, &standard, &mut v);
        assert_eq!(v, [false, false, true, false]);

        r.serialize_lic("absent", &names, &standard, &mut v);
        assert_eq!(v, standard);
    }

    #[test]
    fn lic_set_absent_field_keeps_baselines() {
        let names = NameTable::new("hero", ["a", "b", "c"]);
        let root = json!({"heroes": {"noneOf": ["c"]}});
        let mut r = Reader::new(&root);

        let mut baseline = LicSet::permissive([0, 1].into());
        baseline.all.insert(1);
        let mut lic = baseline.clone();
        r.serialize_lic_set("missing", &mut lic, &names);
        assert_eq!(lic, baseline);

        r.serialize_lic_set("heroes", &mut lic, &names);
        assert_eq!(lic.any, lic.standard);
        assert!(lic.all.is_empty());
        assert_eq!(lic.none, BTreeSet::from([2]));
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn lic_vector_length_mismatch_panics() {
        let names = NameTable::new("town", ["a", "b"]);
        let root = json!({});
        let mut r = Reader::new(&root);
        r.serialize_lic("f", &names, &[true, true], &mut vec![true]);
    }

    #[test]
    fn lic_full_absent_field_keeps_baselines() {
        let names = NameTable::new("town", ["a", "b", "c"]);
        let root = json!({"other": {"allOf": ["a"]}});
        let mut r = Reader::new(&root);

        let mut lic = Lic::new(vec![true, true, false]);
        lic.all[1] = true;
        let before = lic.clone();
        r.serialize_lic_full("missing", &mut lic, &names);
        assert_eq!(lic, before);
    }

    #[test]
    fn lic_full_missing_any_reads_as_standard() {
        let names = NameTable::new("town", ["a", "b", "c"]);
        let root = json!({"f": {"noneOf": ["a"]}});
        let mut r = Reader::new(&root);

        let mut lic = Lic::new(vec![true, true, true]);
        r.serialize_lic_full("f", &mut lic, &names);
        assert_eq!(lic.any, [true, true, true]);
        assert_eq!(lic.none, [true, false, false]);
    }
}
