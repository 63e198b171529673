//! [`SetObject`] — the dual-encoded collection at the heart of this
//! crate: a discriminated union of an [`IntSet`] and a [`HashSet`],
//! dispatched by `match` rather than through a vtable, with a one-way
//! promotion policy from the former to the latter.

use crate::config::SetConfig;
use crate::hashset::HashSet;
use crate::intset::{self, IntSet};
use crate::value::Value;

/// One member of a set, tagged by which encoding produced it.
///
/// Carries either an integer (from an [`IntSet`]) or a byte-string (from
/// a [`HashSet`]); [`Element::to_value`] materializes the canonical byte
/// form either way, for callers (replication, `*STORE` destinations)
/// that need an owned [`Value`] regardless of provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Int(i64),
    Bytes(Value),
}

impl Element {
    /// True if this element came from the `IntSet` side.
    pub fn is_integer(&self) -> bool {
        matches!(self, Element::Int(_))
    }

    /// Materialize this element's canonical byte-string form. Cheap (a
    /// refcount bump) for `Bytes`; a small allocation for `Int`.
    pub fn to_value(&self) -> Value {
        match self {
            Element::Int(n) => Value::from_i64(*n),
            Element::Bytes(v) => v.clone(),
        }
    }
}

/// The SET data type: either a packed sorted array of integers or a
/// general hash set of byte strings.
///
/// Promotion from `IntSet` to `Hash` is one-way (§3, invariant 4) and is
/// triggered only from within [`SetObject::add`].
#[derive(Debug, Clone)]
pub enum SetObject {
    IntSet(IntSet),
    Hash(HashSet),
}

impl SetObject {
    /// An empty set, biased to the `IntSet` encoding so that a caller
    /// building up a result purely from integers never pays for a hash
    /// table it didn't need. Used as the scratch destination for
    /// multi-key algebra and the SPOP rebuild-remainder strategy.
    pub fn empty() -> Self {
        SetObject::IntSet(IntSet::new())
    }

    /// Create a new single-element set, choosing IntSet or Hash encoding
    /// by whether `value` is integer-representable.
    pub fn create_for(value: &Value) -> Self {
        match value.as_canonical_i64() {
            Some(n) => {
                let mut set = IntSet::new();
                set.insert(n);
                SetObject::IntSet(set)
            }
            None => {
                let mut set = HashSet::new();
                set.insert(value.clone());
                SetObject::Hash(set)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SetObject::IntSet(set) => set.len(),
            SetObject::Hash(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_intset(&self) -> bool {
        matches!(self, SetObject::IntSet(_))
    }

    /// Insert `value`, promoting to `Hash` first if needed. Returns
    /// whether `value` was newly inserted.
    ///
    /// Promotion policy (§4.3): promote before inserting a value that
    /// isn't integer-representable; promote after an insertion that
    /// pushes the set past `config.intset_max_entries`.
    pub fn add(&mut self, value: Value, config: &SetConfig) -> bool {
        if let SetObject::IntSet(set) = self {
            match value.as_canonical_i64() {
                Some(n) => {
                    let inserted = set.insert(n);
                    if inserted && set.len() > config.intset_max_entries {
                        self.promote_to_hash();
                    }
                    return inserted;
                }
                None => self.promote_to_hash(),
            }
        }
        match self {
            SetObject::Hash(set) => set.insert(value),
            SetObject::IntSet(_) => unreachable!("promoted above"),
        }
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        match self {
            SetObject::IntSet(set) => value.as_canonical_i64().is_some_and(|n| set.remove(n)),
            SetObject::Hash(set) => set.remove(value),
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            SetObject::IntSet(set) => value.as_canonical_i64().is_some_and(|n| set.contains(n)),
            SetObject::Hash(set) => set.contains(value),
        }
    }

    /// Membership probe specialized for an already-tagged [`Element`]:
    /// the integer-aware fast path from §4.5 — an `Element::Int` probed
    /// against an `IntSet` never round-trips through a formatted decimal
    /// string, and a probe against a `Hash` set never attempts to parse
    /// one.
    pub fn contains_element(&self, element: &Element) -> bool {
        match self {
            SetObject::IntSet(set) => match element {
                Element::Int(n) => set.contains(*n),
                Element::Bytes(v) => v.as_canonical_i64().is_some_and(|n| set.contains(n)),
            },
            SetObject::Hash(set) => set.contains(&element.to_value()),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        match self {
            SetObject::IntSet(set) => Iter::Int(set.iter()),
            SetObject::Hash(set) => Iter::Hash(set.iter()),
        }
    }

    /// Peek a uniformly random element without removing it. `None` only
    /// for an empty set (which, per §3 invariant 3, should never be
    /// reachable from the keyspace, but scratch sets built by multi-key
    /// algebra may transiently be empty).
    pub fn random_element(&self) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        match self {
            SetObject::IntSet(set) => {
                let index = fastrand::usize(0..set.len());
                set.get(index).map(Element::Int)
            }
            SetObject::Hash(set) => {
                let index = fastrand::usize(0..set.len());
                set.get_index(index).cloned().map(Element::Bytes)
            }
        }
    }

    /// Remove and return a uniformly random element.
    pub fn remove_random(&mut self) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        match self {
            SetObject::IntSet(set) => {
                let index = fastrand::usize(0..set.len());
                Some(Element::Int(set.remove_at(index)))
            }
            SetObject::Hash(set) => {
                let index = fastrand::usize(0..set.len());
                set.swap_remove_index(index).map(Element::Bytes)
            }
        }
    }

    /// Promote an `IntSet`-encoded set to `Hash`. A no-op if already
    /// `Hash` (promotion is one-way and idempotent from the caller's
    /// perspective).
    pub fn promote_to_hash(&mut self) {
        if let SetObject::IntSet(set) = self {
            let mut hash = HashSet::with_capacity(set.len());
            for n in set.iter() {
                hash.insert(Value::from_i64(n));
            }
            *self = SetObject::Hash(hash);
        }
    }
}

/// Lazy, tagged iteration over a [`SetObject`]. Never promotes the set
/// and never mutates it.
pub enum Iter<'a> {
    Int(intset::Iter<'a>),
    Hash(indexmap::set::Iter<'a, Value>),
}

impl Iterator for Iter<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        match self {
            Iter::Int(it) => it.next().map(Element::Int),
            Iter::Hash(it) => it.next().map(|v| Element::Bytes(v.clone())),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Int(it) => it.size_hint(),
            Iter::Hash(it) => it.size_hint(),
        }
    }
}
