//! Transport seam between the bridge and its host.
//!
//! Physical framing is out of scope for this crate: how an envelope leaves
//! the process (postMessage, WebSocket, pipe, ...) belongs to the embedding
//! application. The bridge only needs two things from it:
//!
//! - outbound: [`HostTransport::post`] hands a serialized envelope to the
//!   host's addressable target
//! - inbound: the embedding glue feeds raw host replies back through
//!   [`Bridge::deliver`](crate::bridge::Bridge::deliver)

use crate::error::transport::TransportError;

use common::OutboundEnvelope;

/// Outbound half of the host connection.
///
/// Implementations must be cheap to call from the bridge's dispatch task and
/// must not block: a transport that needs async I/O should hand the envelope
/// to its own writer task. Errors are terminal for the envelope in question;
/// the bridge logs them and discards the pending call (no retry at this
/// layer).
pub trait HostTransport: Send + Sync {
    fn post(&self, envelope: &OutboundEnvelope) -> Result<(), TransportError>;
}
