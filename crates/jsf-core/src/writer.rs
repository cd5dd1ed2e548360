use std::rc::Rc;

use serde_json::Value;

use crate::cursor::{Cursor, PathSeg};
use crate::format::Format;
use crate::lic::{self, ALL_OF, ANY_OF, Lic, LicSet, NONE_OF};
use crate::resolver::{IdentifierResolver, encode_guarded};
use crate::tree::{self, NodeKind};
use crate::tribool::Tribool;

/// Writing pass: stores field values into a tree, skipping defaults.
pub struct Writer<'a> {
    root: &'a mut Value,
    cursor: Cursor,
    resolver: Option<Rc<dyn IdentifierResolver>>,
}

impl<'a> Writer<'a> {
    pub fn new(root: &'a mut Value) -> Self {
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
        &*self.root
    }

    fn current_mut(&mut self) -> &mut Value {
        tree::resolve_or_insert(&mut *self.root, self.cursor.segments())
    }

    fn field_mut(&mut self, field: &str) -> &mut Value {
        tree::child_or_insert(self.current_mut(), field)
    }

    /// Sorted names of `ids` under `field.part`; nothing when `ids` is empty.
    fn write_lic_part(
        &mut self,
        field: &str,
        part: &str,
        resolver: &dyn IdentifierResolver,
        ids: impl IntoIterator<Item = i32>,
    ) {
        let mut names: Vec<String> = ids
            .into_iter()
            .map(|id| encode_guarded(resolver, id))
            .collect();
        if names.is_empty() {
            return;
        }
        names.sort();
        let target = tree::child_or_insert(self.field_mut(field), part);
        *target = Value::Array(names.into_iter().map(Value::String).collect());
    }
}

impl Format for Writer<'_> {
    fn saving(&self) -> bool {
        true
    }

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn current(&self) -> Option<&Value> {
        tree::resolve(&*self.root, self.cursor.segments())
    }

    fn ambient_resolver(&self) -> Option<Rc<dyn IdentifierResolver>> {
        self.resolver.clone()
    }

    fn descend(&mut self, seg: PathSeg, kind: NodeKind) {
        self.cursor.push(seg);
        let node = self.current_mut();
        if node.is_null() {
            *node = kind.empty();
        }
    }

    fn ascend(&mut self, depth: usize) {
        self.cursor.truncate(depth);
    }

    fn resize_array(&mut self, len: usize) {
        let node = self.current_mut();
        match node.as_array_mut() {
            Some(items) => items.resize(len, Value::Null),
            None => *node = Value::Array(vec![Value::Null; len]),
        }
    }

    fn primitive_tribool(&mut self, field: &str, value: &mut Tribool) {
        if let Some(b) = value.as_bool() {
            *self.field_mut(field) = Value::Bool(b);
        }
    }

    fn primitive_numeric(&mut self, field: &str, value: &mut f64, default: Option<f64>) {
        if default != Some(*value) {
            *self.field_mut(field) = tree::number(*value);
        }
    }

    fn primitive_enum_string(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        table: &[&str],
    ) {
        if default == Some(*value) {
            return;
        }
        let Some(name) = usize::try_from(*value).ok().and_then(|i| table.get(i)) else {
            panic!(
                "enum value {} out of range for field {:?} at {:?} ({} names)",
                value,
                field,
                self.cursor.to_string(),
                table.len(),
            );
        };
        *self.field_mut(field) = Value::String((*name).to_string());
    }

    fn primitive_identifier(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        resolver: &dyn IdentifierResolver,
    ) {
        if default != Some(*value) {
            let name = encode_guarded(resolver, *value);
            *self.field_mut(field) = Value::String(name);
        }
    }

    fn serialize_string(&mut self, field: &str, value: &mut String) {
        if !value.is_empty() {
            *self.field_mut(field) = Value::String(value.clone());
        }
    }

    fn serialize_string_at(&mut self, index: usize, value: &mut String) {
        *tree::element_or_insert(self.current_mut(), index) = Value::String(value.clone());
    }

    fn serialize_value(&mut self, field: &str, value: &mut Value) {
        if !value.is_null() {
            *self.field_mut(field) = value.clone();
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
        if standard == value.as_slice() {
            return;
        }
        self.write_lic_part(field, ANY_OF, resolver, lic::set_indices(value.as_slice()));
    }

    fn serialize_lic_full(
        &mut self,
        field: &str,
        value: &mut Lic,
        resolver: &dyn IdentifierResolver,
    ) {
        if value.any != value.standard {
            self.write_lic_part(field, ANY_OF, resolver, lic::set_indices(&value.any));
        }
        self.write_lic_part(field, ALL_OF, resolver, lic::set_indices(&value.all));
        self.write_lic_part(field, NONE_OF, resolver, lic::set_indices(&value.none));
    }

    fn serialize_lic_set(
        &mut self,
        field: &str,
        value: &mut LicSet,
        resolver: &dyn IdentifierResolver,
    ) {
        if value.any != value.standard {
            self.write_lic_part(field, ANY_OF, resolver, value.any.iter().copied());
        }
        self.write_lic_part(field, ALL_OF, resolver, value.all.iter().copied());
        self.write_lic_part(field, NONE_OF, resolver, value.none.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FnResolver;
    use serde_json::json;

    fn letters() -> impl IdentifierResolver {
        FnResolver::new(
            |s: &str| s.bytes().next().map_or(-1, |b| i32::from(b) - i32::from(b'A')),
            |i: i32| char::from(b'A' + i as u8).to_string(),
        )
    }

    #[test]
    fn sparse_scalars() {
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_bool("on", &mut true);
        w.serialize_bool("off", &mut false);
        w.serialize_tribool("maybe", &mut Tribool::Unknown);
        w.serialize_tribool("no", &mut Tribool::False);
        w.serialize_numeric_or("same", &mut 5, 5);
        w.serialize_numeric_or("diff", &mut 6, 5);
        w.serialize_numeric("always", &mut 0u8);
        w.serialize_string("empty", &mut String::new());
        w.serialize_string("name", &mut "x".to_string());
        assert_eq!(
            root,
            json!({"on": true, "no": false, "diff": 6, "always": 0, "name": "x"})
        );
    }

    #[test]
    fn enum_and_identifier_fields() {
        let mut root = json!({});
        let r = letters();
        let mut w = Writer::new(&mut root);
        let table = ["low", "mid", "high"];
        w.serialize_numeric_enum("level", &table, 0, &mut 2);
        w.serialize_numeric_enum("skipped", &table, 1, &mut 1);
        w.serialize_id("owner", &r, -1, &mut 3);
        w.serialize_id("nobody", &r, -1, &mut -1);
        w.serialize_enum_bool("mode", "yes", "no", &mut false);
        assert_eq!(root, json!({"level": "high", "owner": "D", "mode": "no"}));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn enum_index_outside_table_panics() {
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_numeric_enum("level", &["a"], 0, &mut 4);
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn lic_vector_length_mismatch_panics() {
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_lic("f", &letters(), &[true, true], &mut vec![true]);
    }

    #[test]
    fn lic_vector_sorted_by_name() {
        let r = FnResolver::new(
            |s: &str| s.trim_start_matches("id").parse().unwrap_or(-1),
            |i: i32| format!("id{}", i),
        );
        let standard = vec![false; 4];
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_lic("allowed", &r, &standard, &mut vec![false, true, true, true]);
        assert_eq!(root, json!({"allowed": {"anyOf": ["id1", "id2", "id3"]}}));
    }

    #[test]
    fn lic_vector_equal_to_standard_is_elided() {
        let standard = vec![true, false, true];
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_lic("allowed", &letters(), &standard, &mut standard.clone());
        assert_eq!(root, json!({}));
    }

    #[test]
    fn lic_set_parts_are_independent() {
        let mut lic = LicSet::permissive([0, 1, 2, 3].into());
        lic.all.insert(2);
        lic.none.extend([3, 1]);
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_lic_set("heroes", &mut lic, &letters());
        assert_eq!(
            root,
            json!({"heroes": {"allOf": ["C"], "noneOf": ["B", "D"]}})
        );
    }

    #[test]
    fn lic_full_empty_any_is_not_written() {
        let mut lic = Lic::new(vec![true, true, true]);
        lic.none[0] = true;
        let mut root = json!({});
        let mut w = Writer::new(&mut root);
        w.serialize_lic_full("f", &mut lic, &letters());
        assert_eq!(root, json!({"f": {"noneOf": ["A"]}}));
    }

    #[test]
    fn nested_scopes_create_containers() {
        let mut root = Value::Null;
        let mut w = Writer::new(&mut root);
        {
            let mut a = w.enter_struct("a");
            let mut list = a.enter_array("list");
            list.serialize_strings(&mut vec!["x".into(), "y".into()]);
            let mut e = list.enter_element(3);
            e.serialize_numeric("n", &mut 1);
        }
        assert!(w.cursor().is_root());
        assert_eq!(root, json!({"a": {"list": ["x", "y", null, {"n": 1}]}}));
    }
}
