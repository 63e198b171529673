//! The closed error type for the command layer, in the style of the
//! teacher's own hand-rolled `TryReserveError`: a small `Clone`-friendly
//! enum with a hand-written `Display` and a blanket `Error` impl, no
//! `thiserror`/`anyhow` indirection.

use std::fmt;

/// Everything that can make a SET command abort without mutating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// The key exists and does not hold a SET value.
    WrongType,
    /// Malformed arguments (bad count syntax, wrong arity).
    Syntax(String),
    /// A count argument was negative where only non-negative is accepted.
    OutOfRange,
    /// The allocator collaborator failed to satisfy a reservation; the
    /// command aborts before any observable mutation.
    Allocation,
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetError::WrongType => {
                write!(f, "WRONGTYPE Operation against a key holding the wrong kind of value")
            }
            SetError::Syntax(msg) => write!(f, "{msg}"),
            SetError::OutOfRange => write!(f, "value is out of range, must be positive"),
            SetError::Allocation => write!(f, "command not allowed, out of memory"),
        }
    }
}

impl std::error::Error for SetError {}
