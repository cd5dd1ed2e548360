//! jsf-core: symmetric, schema-driven serialization over JSON trees
//!
//! One call site serves both directions: a [`Format`] is either a
//! [`Writer`] (typed values -> `serde_json::Value`) or a [`Reader`]
//! (`serde_json::Value` -> typed values), and the same sequence of
//! `serialize_*` calls drives either pass.
//!
//! This crate focuses on a small surface:
//! - Cursor and scope guards for nested objects and arrays
//! - Typed field wrappers funnelled through four primitives
//! - Sparse writing (defaults are elided) and defaulting on read
//! - Logical identifier conditions (`anyOf` / `allOf` / `noneOf`)
//! - JSON document load/save helpers
//!
pub mod convert;
pub mod cursor;
pub mod document;
pub mod error;
pub mod format;
pub mod lic;
pub mod reader;
pub mod resolver;
pub mod scope;
pub mod tree;
pub mod tribool;
pub mod writer;

pub use convert::{EnumIndex, Identifier, Numeric};
pub use cursor::{Cursor, PathSeg};
pub use document::{SaveOptions, load_json, read_with, remove_field, save_json, write_with};
pub use error::{Error, Result};
pub use format::Format;
pub use lic::{ALL_OF, ANY_OF, Lic, LicSet, NONE_OF};
pub use reader::Reader;
pub use resolver::{FnResolver, IdentifierResolver, NO_ID, NameTable};
pub use scope::{ArrayScope, StructScope};
pub use tribool::Tribool;
pub use writer::Writer;
