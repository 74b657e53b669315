//! Wire envelope models exchanged between the bridge and its host.
//!
//! Field order and positional argument semantics are load-bearing: the host
//! dispatches purely on the `func` name and the position of each entry in
//! `args`. Argument arrays must therefore be preserved exactly, including
//! `null` gaps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved request id for the handshake envelope.
///
/// The bridge's id counter issues ids starting at 0, so the handshake lives
/// outside the counter's range entirely. A host acknowledgment bearing this
/// id is the handshake acknowledgment; it is never routed to a caller.
pub const HANDSHAKE_ID: u64 = u64::MAX;

/// Request unit sent from the bridge to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    /// Unique for the lifetime of the process; assigned at envelope creation.
    pub id: u64,

    /// Dotted operation name, e.g. `files.getCloudStorageFolders`.
    pub func: String,

    /// Positional arguments, in call order.
    pub args: Vec<Value>,

    /// Monotonic dispatch order, stamped when the envelope is handed to the
    /// transport. Queued envelopes keep their creation-order `id` but carry
    /// a `seq` reflecting the order they actually left the bridge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

/// Response unit received from the host, correlated by `id`.
///
/// The payload convention is positional: `(error_or_null, ...results)` for
/// single-shot calls, `(more_will_follow, ...results)` for multi-shot
/// streams. The bridge core does not interpret either shape beyond the
/// leading stream flag; meaning belongs to the call wrapper layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub args: Vec<Value>,
}
