use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

/// Identifier returned by [`IdentifierResolver::decode`] for names it
/// cannot resolve.
pub const NO_ID: i32 = -1;

/// Maps between string identifiers and numeric ids.
///
/// Contract:
/// - `decode` must not panic. It reports unresolved names itself (for
///   example with a log line) and returns a sentinel, normally [`NO_ID`].
///   The format passes that sentinel through verbatim.
/// - `encode` may assume `id` is valid and need not bounds-check.
///
/// The format guards both calls: a panicking `decode` is logged and
/// yields [`NO_ID`]; a panicking `encode` is logged and the panic is
/// resumed.
pub trait IdentifierResolver {
    fn decode(&self, identifier: &str) -> i32;
    fn encode(&self, id: i32) -> String;
}

/// Resolver built from a pair of closures.
pub struct FnResolver<D, E> {
    decode: D,
    encode: E,
}

impl<D, E> FnResolver<D, E>
where
    D: Fn(&str) -> i32,
    E: Fn(i32) -> String,
{
    pub fn new(decode: D, encode: E) -> Self {
        Self { decode, encode }
    }
}

impl<D, E> IdentifierResolver for FnResolver<D, E>
where
    D: Fn(&str) -> i32,
    E: Fn(i32) -> String,
{
    fn decode(&self, identifier: &str) -> i32 {
        (self.decode)(identifier)
    }

    fn encode(&self, id: i32) -> String {
        (self.encode)(id)
    }
}

/// Resolver over an ordered list of names: the id of a name is its
/// position in the list.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    scope: String,
    names: Vec<String>,
    index: HashMap<String, i32>,
}

impl NameTable {
    /// `scope` names the table in log output (e.g. `"hero"`).
    pub fn new<I, S>(scope: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as i32))
            .collect();
        Self {
            scope: scope.to_string(),
            names,
            index,
        }
    }

    /// One name per line; blank lines and `#` comments are skipped.
    pub fn from_lines(scope: &str, text: &str) -> Self {
        Self::new(
            scope,
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl IdentifierResolver for NameTable {
    fn decode(&self, identifier: &str) -> i32 {
        match self.index.get(identifier) {
            Some(id) => *id,
            None => {
                warn!(scope = %self.scope, identifier, "unknown identifier");
                NO_ID
            }
        }
    }

    fn encode(&self, id: i32) -> String {
        self.names[id as usize].clone()
    }
}

pub(crate) fn decode_guarded(resolver: &dyn IdentifierResolver, identifier: &str) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(|| resolver.decode(identifier))) {
        Ok(id) => id,
        Err(_) => {
            error!(identifier, "identifier decoder panicked; using sentinel");
            NO_ID
        }
    }
}

pub(crate) fn encode_guarded(resolver: &dyn IdentifierResolver, id: i32) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| resolver.encode(id))) {
        Ok(name) => name,
        Err(payload) => {
            error!(id, "identifier encoder panicked");
            panic::resume_unwind(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_table_round_trip() {
        let t = NameTable::from_lines("town", "# towns\ncastle\n\nrampart\n tower \n");
        assert_eq!(t.len(), 3);
        assert_eq!(t.decode("tower"), 2);
        assert_eq!(t.encode(1), "rampart");
        assert_eq!(t.decode("inferno"), NO_ID);
    }

    #[test]
    fn panicking_decoder_yields_sentinel() {
        let r = FnResolver::new(|_: &str| -> i32 { panic!("boom") }, |i: i32| i.to_string());
        assert_eq!(decode_guarded(&r, "x"), NO_ID);
        assert_eq!(encode_guarded(&r, 4), "4");
    }

    #[test]
    #[should_panic]
    fn panicking_encoder_is_fatal() {
        let t = NameTable::new("empty", Vec::<String>::new());
        encode_guarded(&t, 3);
    }
}
