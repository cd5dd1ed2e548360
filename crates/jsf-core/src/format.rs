use std::rc::Rc;

use serde_json::Value;

use crate::convert::{EnumIndex, Identifier, Numeric};
use crate::cursor::{Cursor, PathSeg};
use crate::lic::{Lic, LicSet};
use crate::resolver::IdentifierResolver;
use crate::scope::{ArrayScope, StructScope};
use crate::tree::NodeKind;
use crate::tribool::Tribool;

/// One serialization pass over a JSON tree, either writing or reading.
///
/// Every `serialize_*` call targets one child of the current node,
/// named by `field`. On a writing pass the call stores the caller's
/// value; on a reading pass it overwrites the caller's value with what
/// the tree holds. Fields equal to their default are not written, and
/// absent fields read back as that default.
///
/// [`Writer`](crate::Writer) and [`Reader`](crate::Reader) implement the
/// primitives; the typed wrappers are provided methods shared by both.
pub trait Format {
    /// `true` for a writing pass.
    fn saving(&self) -> bool;

    fn cursor(&self) -> &Cursor;

    /// The node at the cursor, if it exists.
    fn current(&self) -> Option<&Value>;

    /// Resolver used by [`Format::serialize_instance`].
    fn ambient_resolver(&self) -> Option<Rc<dyn IdentifierResolver>>;

    /// Moves the cursor one step down. Scope guards are the only callers.
    #[doc(hidden)]
    fn descend(&mut self, seg: PathSeg, kind: NodeKind);

    /// Moves the cursor back to `depth`. Scope guards are the only callers.
    #[doc(hidden)]
    fn ascend(&mut self, depth: usize);

    /// Sets the length of the array at the cursor (no-op when reading).
    #[doc(hidden)]
    fn resize_array(&mut self, len: usize);

    // ---- primitives ----

    fn primitive_tribool(&mut self, field: &str, value: &mut Tribool);

    fn primitive_numeric(&mut self, field: &str, value: &mut f64, default: Option<f64>);

    /// `value` indexes `table`; an index outside the table is a caller
    /// bug and panics when writing.
    fn primitive_enum_string(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        table: &[&str],
    );

    fn primitive_identifier(
        &mut self,
        field: &str,
        value: &mut i32,
        default: Option<i32>,
        resolver: &dyn IdentifierResolver,
    );

    // ---- direction-specific fields ----

    /// Empty string is the default.
    fn serialize_string(&mut self, field: &str, value: &mut String);

    /// String element `index` of the array at the cursor.
    fn serialize_string_at(&mut self, index: usize, value: &mut String);

    /// Opaque subtree; null is the default.
    fn serialize_value(&mut self, field: &str, value: &mut Value);

    /// Restrictive ("anyOf") condition against `standard`.
    ///
    /// `value` must have the length of `standard`. Writing elides the field
    /// when `value == standard`. Reading accepts `allOf` as `anyOf` and
    /// applies `noneOf`.
    fn serialize_lic(
        &mut self,
        field: &str,
        resolver: &dyn IdentifierResolver,
        standard: &[bool],
        value: &mut Vec<bool>,
    );

    /// Condition with independent parts. `anyOf` is written only when `any`
    /// differs from `standard`, and an empty part is never written, so an
    /// empty `any` reads back as `standard`. Reading an absent field leaves
    /// all three parts untouched.
    fn serialize_lic_full(
        &mut self,
        field: &str,
        value: &mut Lic,
        resolver: &dyn IdentifierResolver,
    );

    /// Sparse form of [`Format::serialize_lic_full`], same rules.
    fn serialize_lic_set(
        &mut self,
        field: &str,
        value: &mut LicSet,
        resolver: &dyn IdentifierResolver,
    );

    // ---- scopes ----

    fn enter_struct(&mut self, field: &str) -> StructScope<'_, Self> {
        StructScope::new(self, PathSeg::key(field))
    }

    fn enter_array(&mut self, field: &str) -> ArrayScope<'_, Self> {
        ArrayScope::new(self, PathSeg::key(field))
    }

    /// Runs `visit` inside nested struct scopes named by `path`.
    fn within<R>(&mut self, path: &[&str], visit: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        match path.split_first() {
            None => visit(self),
            Some((head, rest)) => {
                let mut scope = self.enter_struct(head);
                scope.within(rest, visit)
            }
        }
    }

    // ---- typed wrappers ----

    /// Written only when `true`; absent reads as `false`.
    fn serialize_bool(&mut self, field: &str, value: &mut bool) {
        let mut temp = if *value { Tribool::True } else { Tribool::Unknown };
        self.primitive_tribool(field, &mut temp);
        if !self.saving() {
            *value = temp == Tribool::True;
        }
    }

    fn serialize_tribool(&mut self, field: &str, value: &mut Tribool) {
        self.primitive_tribool(field, value);
    }

    /// `value` is stored as `true` when it equals `true_value`.
    fn serialize_bool_as<T: Copy + PartialEq>(
        &mut self,
        field: &str,
        value: &mut T,
        true_value: T,
        false_value: T,
    ) {
        let mut temp = *value == true_value;
        self.serialize_bool(field, &mut temp);
        if !self.saving() {
            *value = if temp { true_value } else { false_value };
        }
    }

    /// Three-way mapping: any other value is written as nothing, and an
    /// absent field reads as `default_value`.
    fn serialize_bool_or<T: Copy + PartialEq>(
        &mut self,
        field: &str,
        value: &mut T,
        true_value: T,
        false_value: T,
        default_value: T,
    ) {
        let mut temp = if *value == true_value {
            Tribool::True
        } else if *value == false_value {
            Tribool::False
        } else {
            Tribool::Unknown
        };
        self.primitive_tribool(field, &mut temp);
        if !self.saving() {
            *value = match temp {
                Tribool::True => true_value,
                Tribool::False => false_value,
                Tribool::Unknown => default_value,
            };
        }
    }

    /// Bool written as one of two strings, always present.
    fn serialize_enum_bool(
        &mut self,
        field: &str,
        true_value: &str,
        false_value: &str,
        value: &mut bool,
    ) {
        let mut temp = i32::from(*value);
        self.primitive_enum_string(field, &mut temp, None, &[false_value, true_value]);
        if !self.saving() {
            *value = temp == 1;
        }
    }

    /// Always written.
    fn serialize_numeric<T: Numeric>(&mut self, field: &str, value: &mut T) {
        let mut temp = value.to_f64();
        self.primitive_numeric(field, &mut temp, None);
        if !self.saving() {
            *value = T::from_f64(temp);
        }
    }

    fn serialize_numeric_or<T: Numeric>(&mut self, field: &str, value: &mut T, default: T) {
        let mut temp = value.to_f64();
        self.primitive_numeric(field, &mut temp, Some(default.to_f64()));
        if !self.saving() {
            *value = T::from_f64(temp);
        }
    }

    /// Number written as its name in `table`.
    fn serialize_numeric_enum<T: EnumIndex>(
        &mut self,
        field: &str,
        table: &[&str],
        default: T,
        value: &mut T,
    ) {
        let mut temp = value.to_index();
        self.primitive_enum_string(field, &mut temp, Some(default.to_index()), table);
        if !self.saving() {
            *value = T::from_index(temp);
        }
    }

    fn serialize_id<T: Identifier>(
        &mut self,
        field: &str,
        resolver: &dyn IdentifierResolver,
        default: T,
        value: &mut T,
    ) {
        let mut temp = value.num();
        self.primitive_identifier(field, &mut temp, Some(default.num()), resolver);
        if !self.saving() {
            *value = T::from_num(temp);
        }
    }

    /// Like [`Format::serialize_id`] with the ambient resolver. Panics when
    /// the format was built without one.
    fn serialize_instance<T: Identifier>(&mut self, field: &str, default: T, value: &mut T) {
        let Some(resolver) = self.ambient_resolver() else {
            panic!("serialize_instance({field}): format has no ambient resolver");
        };
        self.serialize_id(field, resolver.as_ref(), default, value);
    }
}
