//! Logical identifier conditions.
//!
//! A condition restricts a set of ids relative to a baseline
//! (`standard`): at least one of `any`, every one of `all`, none of
//! `none`. The three parts are independent; how they combine is up to
//! the consumer ([`LicSet::matches`] is the usual reading).
//!
//! Serialized shape, each part optional and sorted by name:
//!
//! ```json
//! { "anyOf": ["a", "b"], "allOf": ["c"], "noneOf": ["d"] }
//! ```
use std::collections::BTreeSet;

pub const ANY_OF: &str = "anyOf";
pub const ALL_OF: &str = "allOf";
pub const NONE_OF: &str = "noneOf";

/// Condition over a dense id domain, one flag per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lic {
    pub standard: Vec<bool>,
    pub any: Vec<bool>,
    pub all: Vec<bool>,
    pub none: Vec<bool>,
}

impl Lic {
    /// All three parts empty, sized like `standard`.
    pub fn new(standard: Vec<bool>) -> Self {
        let n = standard.len();
        Self {
            standard,
            any: vec![false; n],
            all: vec![false; n],
            none: vec![false; n],
        }
    }

    /// `any` preset to `standard`: the condition that restricts nothing.
    pub fn permissive(standard: Vec<bool>) -> Self {
        let mut lic = Self::new(standard);
        lic.any.clone_from(&lic.standard);
        lic
    }
}

/// Condition over a sparse id domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicSet {
    pub standard: BTreeSet<i32>,
    pub any: BTreeSet<i32>,
    pub all: BTreeSet<i32>,
    pub none: BTreeSet<i32>,
}

impl LicSet {
    pub fn new(standard: BTreeSet<i32>) -> Self {
        Self {
            standard,
            ..Self::default()
        }
    }

    pub fn permissive(standard: BTreeSet<i32>) -> Self {
        Self {
            any: standard.clone(),
            standard,
            ..Self::default()
        }
    }

    /// `candidate` satisfies the condition: it shares an id with `any`
    /// (when `any` is non-empty), contains all of `all` and none of
    /// `none`.
    pub fn matches(&self, candidate: &BTreeSet<i32>) -> bool {
        (self.any.is_empty() || !self.any.is_disjoint(candidate))
            && self.all.is_subset(candidate)
            && self.none.is_disjoint(candidate)
    }
}

/// Ids whose flag is set, in index order.
pub(crate) fn set_indices(flags: &[bool]) -> impl Iterator<Item = i32> + '_ {
    flags
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .map(|(i, _)| i as i32)
}
