//! The general byte-string set collaborator, built directly on
//! [`indexmap::IndexSet`] — the teacher crate's own core dependency.
//!
//! `IndexSet` gives O(1) expected membership and, crucially, O(1)
//! index-based access, which is what makes uniform random-element
//! selection (§3 of the spec) cheap: pick a random index in `0..len` and
//! fetch it, rather than walking a bucket chain.

use indexmap::IndexSet;

use crate::value::Value;

/// A hash set of [`Value`]s with O(1) expected membership and index-based
/// random access.
#[derive(Debug, Clone, Default)]
pub struct HashSet {
    inner: IndexSet<Value>,
}

impl HashSet {
    pub fn new() -> Self {
        HashSet {
            inner: IndexSet::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        HashSet {
            inner: IndexSet::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.inner.contains(value.as_bytes())
    }

    pub fn insert(&mut self, value: Value) -> bool {
        self.inner.insert(value)
    }

    /// Remove `value`. Uses swap-removal: the set's own iteration order is
    /// not a contract this collaborator promises beyond "stable for the
    /// duration of one unmutated pass" (§3), so there is no reason to pay
    /// `IndexSet`'s O(n) shift-removal cost here.
    pub fn remove(&mut self, value: &Value) -> bool {
        self.inner.swap_remove(value.as_bytes())
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.inner.get_index(index)
    }

    pub fn swap_remove_index(&mut self, index: usize) -> Option<Value> {
        self.inner.swap_remove_index(index)
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Value> {
        self.inner.iter()
    }
}
