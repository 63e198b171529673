//! The command layer: free functions that look a key up through a
//! [`crate::keyspace::Keyspace`], drive [`crate::SetObject`] operations,
//! and report mutations through a [`crate::events::Notifier`] and a
//! [`crate::replication::Replicator`].
//!
//! Split the way the spec splits it: [`single_key`] for commands that
//! act on one key (`SADD`, `SREM`, `SMOVE`, `SPOP`, `SRANDMEMBER`, …) and
//! [`multi_key`] for the set-algebra commands over an ordered key list
//! (`SINTER`, `SUNION`, `SDIFF`, and their `*STORE` variants).

pub mod multi_key;
pub mod single_key;

use crate::error::SetError;
use crate::events::{EventKind, KeyspaceEvent, Notifier};
use crate::keyspace::Keyspace;
use crate::object::SetObject;

/// Shared "storage of results" semantics for the `*STORE` command
/// family (§4.5): delete any existing destination value first, then
/// either install the new set and emit its event, or — if the result is
/// empty — emit `del` only when a prior value actually existed. Returns
/// the resulting cardinality.
pub(crate) fn store_result(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    dst: &[u8],
    result: SetObject,
    kind: EventKind,
) -> u64 {
    let existed = ks.contains(dst);
    if existed {
        ks.remove(dst);
    }
    let size = result.len() as u64;
    if result.is_empty() {
        if existed {
            notifier.notify(KeyspaceEvent::new(EventKind::Del, dst, 1));
        }
    } else {
        ks.insert(dst, result);
        notifier.notify(KeyspaceEvent::new(kind, dst, size));
    }
    size
}

/// Parse a `[count]` argument: signed 64-bit decimal. Non-integer text is
/// a syntax error; a value outside `i64`'s range is an out-of-range
/// error (§6, count parsing).
pub(crate) fn parse_count(raw: &[u8]) -> Result<i64, SetError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| SetError::Syntax("value is not an integer or out of range".into()))?;
    text.parse::<i64>().map_err(|e| {
        use std::num::IntErrorKind::*;
        match e.kind() {
            PosOverflow | NegOverflow => SetError::OutOfRange,
            _ => SetError::Syntax("value is not an integer or out of range".into()),
        }
    })
}
