use thiserror::Error;

use crate::Address;

/// Wire format violations. Fatal to the single frame being processed, never
/// to the node handling it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A name does not fit its fixed-width field.
    #[error("field {field:?} does not fit in {width} bytes")]
    FieldOverflow { field: String, width: usize },
    /// The frame is shorter than the minimum header.
    #[error("frame is {len} bytes, minimum header is {min}")]
    Truncated { len: usize, min: usize },
    /// The header bytes are not valid ASCII text.
    #[error("frame header is not ascii")]
    BadHeader,
    /// The kind tag is neither data nor control.
    #[error("unknown packet kind tag {0:?}")]
    UnknownKind(char),
    /// A parenthesised route group does not have exactly three fields.
    #[error("malformed route triple ({0})")]
    MalformedTriple(String),
    /// The cost field of a route triple is not a non-negative integer.
    #[error("route cost {0:?} is not a non-negative integer")]
    BadCost(String),
}

/// Interface queue failures. `Full` is expected under congestion and is
/// treated as packet loss by every caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is at capacity")]
    Full,
    #[error("queue is closed")]
    Closed,
}

/// Routing configuration violations. These abort the processing of one
/// packet before any routing table mutation is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A routing update arrived from a node that is not a direct neighbour
    /// on the interface it came in on.
    #[error("advertiser {advertiser} is not a direct neighbour on interface {interface}")]
    UnknownAdvertiser { advertiser: Address, interface: usize },
    /// The destination has no routing table entry.
    #[error("no route to {0}")]
    NoRoute(Address),
    /// The chosen next hop has no interface in the cost table.
    #[error("next hop {0} does not resolve to an interface")]
    UnresolvedNextHop(Address),
}
