#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

//! [`SetObject`] is the SET data type of an in-memory key-value store: a
//! collection that transparently picks between two internal
//! representations — a packed, sorted array of integers (an "intset") and a
//! general hash set of byte strings (a "htset") — to stay small when every
//! member happens to be an integer, and promotes itself, one way only, the
//! moment that stops being true.
//!
//! The type itself never talks to a keyspace, a replication log, or a wire
//! protocol; those are external collaborators, represented here as small
//! traits ([`keyspace::Keyspace`], [`replication::Replicator`],
//! [`events::Notifier`]) so the command layer in [`commands`] can be driven
//! end to end in tests without a real server behind it.
//!
//! ### Highlights
//!
//! - [`SetObject`] — the dual-encoded collection itself (module [`object`]),
//!   backed by [`IntSet`] and [`HashSet`].
//! - [`commands::single_key`] — `SADD`, `SREM`, `SMOVE`, `SPOP`,
//!   `SRANDMEMBER`, and their counted/store variants.
//! - [`commands::multi_key`] — `SINTER`, `SUNION`, `SDIFF` and their
//!   `*STORE` variants, each with cost-aware algorithm selection.
//! - [`replication`] — the shim that rewrites non-deterministic destructive
//!   commands into deterministic ones before they reach the log/replicas.
//!
//! ### Feature Flags
//!
//! * `quickcheck`: adds [`quickcheck::Arbitrary`] impls for [`Value`] and
//!   [`SetObject`], used by this crate's own property tests and available
//!   to downstream generative tests.
//! * `arbitrary`: adds [`arbitrary::Arbitrary`] impls for the same types,
//!   for fuzz-harness use.
//! * `serde`: adds [`serde::Serialize`]/[`serde::Deserialize`] impls for
//!   [`SetObject`], encoding it as a tagged sequence of integers or byte
//!   strings depending on its current representation. This is the only
//!   surface this crate exposes toward persistence; the persistence engine
//!   itself is out of scope (see the crate-level docs in `SPEC_FULL.md`).
//!
//! _Note: no feature is enabled by default._

mod config;
mod error;
mod hashset;
mod intset;
mod value;

pub mod commands;
pub mod events;
pub mod keyspace;
pub mod object;
pub mod replication;

#[cfg(feature = "arbitrary")]
mod arbitrary_impl;
#[cfg(feature = "serde")]
mod serde_impl;

pub use config::SetConfig;
pub use error::SetError;
pub use hashset::HashSet;
pub use intset::{IntSet, Iter as IntSetIter};
pub use object::{Element, SetObject};
pub use value::Value;
