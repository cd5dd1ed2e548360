//! Scope guards that move a format's cursor into a child node.
//!
//! A guard records the cursor depth it was opened at and truncates back
//! to it when dropped. Nested guards mutably borrow their parent, so the
//! borrow checker enforces last-in-first-out nesting.
use std::ops::{Deref, DerefMut};

use serde_json::Value;
use tracing::trace;

use crate::cursor::PathSeg;
use crate::format::Format;
use crate::tree::NodeKind;

/// Cursor inside a child object.
///
/// Derefs to the format, so field operations and further `enter_*` calls
/// go through the guard.
pub struct StructScope<'f, F: Format + ?Sized> {
    format: &'f mut F,
    parent_depth: usize,
}

impl<'f, F: Format + ?Sized> StructScope<'f, F> {
    pub(crate) fn new(format: &'f mut F, seg: PathSeg) -> Self {
        let parent_depth = format.cursor().depth();
        format.descend(seg, NodeKind::Object);
        trace!(cursor = %format.cursor(), "enter struct");
        Self {
            format,
            parent_depth,
        }
    }

    /// The object this scope points at, if it exists.
    pub fn node(&self) -> Option<&Value> {
        self.format.current()
    }
}

impl<F: Format + ?Sized> Deref for StructScope<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        &*self.format
    }
}

impl<F: Format + ?Sized> DerefMut for StructScope<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        &mut *self.format
    }
}

impl<F: Format + ?Sized> Drop for StructScope<'_, F> {
    fn drop(&mut self) {
        self.format.ascend(self.parent_depth);
    }
}

/// Cursor inside a child array.
pub struct ArrayScope<'f, F: Format + ?Sized> {
    format: &'f mut F,
    parent_depth: usize,
}

impl<'f, F: Format + ?Sized> ArrayScope<'f, F> {
    pub(crate) fn new(format: &'f mut F, seg: PathSeg) -> Self {
        let parent_depth = format.cursor().depth();
        format.descend(seg, NodeKind::Array);
        trace!(cursor = %format.cursor(), "enter array");
        Self {
            format,
            parent_depth,
        }
    }

    /// Number of elements; 0 when the array is absent.
    pub fn len(&self) -> usize {
        self.format
            .current()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writing pass: pads with nulls or truncates. Reading pass: no-op.
    pub fn resize(&mut self, len: usize) {
        self.format.resize_array(len);
    }

    /// Scope on element `index`, treated as an object.
    pub fn enter_element(&mut self, index: usize) -> StructScope<'_, F> {
        StructScope::new(&mut *self.format, PathSeg::Index(index))
    }

    pub fn serialize_string_at(&mut self, index: usize, value: &mut String) {
        self.format.serialize_string_at(index, value);
    }

    /// Whole list of strings: the array takes the length of `values` when
    /// writing, and `values` takes the length of the array when reading.
    pub fn serialize_strings(&mut self, values: &mut Vec<String>) {
        if self.format.saving() {
            self.resize(values.len());
        } else {
            values.resize(self.len(), String::new());
        }
        for (i, v) in values.iter_mut().enumerate() {
            self.format.serialize_string_at(i, v);
        }
    }
}

impl<F: Format + ?Sized> Deref for ArrayScope<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        &*self.format
    }
}

impl<F: Format + ?Sized> DerefMut for ArrayScope<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        &mut *self.format
    }
}

impl<F: Format + ?Sized> Drop for ArrayScope<'_, F> {
    fn drop(&mut self) {
        self.format.ascend(self.parent_depth);
    }
}
