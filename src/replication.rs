//! The replication shim (§4.6): isolates the "rewrite me and suppress
//! the original" protocol that lets a non-deterministic destructive
//! command (`SPOP`) reach the append-only log and replicas as one or
//! more deterministic commands instead.

use crate::value::Value;

/// Where a propagated command should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationTarget {
    Aof,
    Replicas,
    Both,
}

/// The replication collaborator. `argv[0]` names the command; the rest
/// are its arguments, already finalized to byte-string form (never a raw
/// integer masquerading as an object pointer — see §9, source anomaly
/// 2).
pub trait Replicator {
    /// Write a derived command to the log/replicas.
    fn propagate(&mut self, argv: Vec<Value>, target: PropagationTarget);

    /// Replace the currently executing command's own vector before
    /// log/replica emission (used for the uncounted SPOP, which rewrites
    /// to a single deterministic `SREM`).
    fn rewrite_current(&mut self, argv: Vec<Value>);

    /// Skip emission of the currently executing command; its
    /// derivatives have already been (or will be) propagated instead.
    fn suppress_current(&mut self);
}

/// A `Replicator` that discards everything.
#[derive(Debug, Default)]
pub struct NullReplicator;

impl Replicator for NullReplicator {
    fn propagate(&mut self, _argv: Vec<Value>, _target: PropagationTarget) {}
    fn rewrite_current(&mut self, _argv: Vec<Value>) {}
    fn suppress_current(&mut self) {}
}

/// A `Replicator` that records everything, for tests asserting on the
/// exact sequence of propagated/rewritten commands (§8, property 9).
#[derive(Debug, Default)]
pub struct RecordingReplicator {
    pub propagated: Vec<Vec<Value>>,
    pub rewritten: Option<Vec<Value>>,
    pub suppressed: bool,
}

impl Replicator for RecordingReplicator {
    fn propagate(&mut self, argv: Vec<Value>, _target: PropagationTarget) {
        self.propagated.push(argv);
    }

    fn rewrite_current(&mut self, argv: Vec<Value>) {
        self.rewritten = Some(argv);
    }

    fn suppress_current(&mut self) {
        self.suppressed = true;
    }
}

impl RecordingReplicator {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build an `SREM key elem` argv, finalizing `elem`'s bytes first.
pub fn srem_argv(key: &[u8], elem: &crate::object::Element) -> Vec<Value> {
    vec![
        Value::from("SREM"),
        Value::from(key),
        elem.to_value(),
    ]
}

/// Build a `DEL key` argv.
pub fn del_argv(key: &[u8]) -> Vec<Value> {
    vec![Value::from("DEL"), Value::from(key)]
}
