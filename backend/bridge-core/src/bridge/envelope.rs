//! Envelope construction and parsing.
//!
//! The codec owns the request-id counter. Ids start at 0, increase
//! monotonically, and are never reused - a teardown does not reset the
//! counter, so a response that straggles in after a re-initialize can never
//! collide with a fresh call. The handshake envelope sits outside the
//! counter on the reserved [`HANDSHAKE_ID`].

use crate::{BRIDGE_VERSION, HANDSHAKE_FUNC};

use common::{HANDSHAKE_ID, OutboundEnvelope, ResponseEnvelope};

use log::warn;
use serde_json::Value;

pub(crate) struct EnvelopeCodec {
    next_id: u64,
    next_seq: u64,
}

impl EnvelopeCodec {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Build an outbound envelope for a domain call, consuming the next id.
    ///
    /// The argument list is packaged exactly as given: call order preserved,
    /// `null` gaps included. `seq` stays unset until dispatch.
    pub(crate) fn encode(&mut self, func: &str, args: Vec<Value>) -> OutboundEnvelope {
        let id = self.next_id;
        self.next_id += 1;

        OutboundEnvelope {
            id,
            func: func.to_string(),
            args,
            seq: None,
        }
    }

    /// Build the reserved handshake envelope. Does not consume an id.
    pub(crate) fn handshake(&self) -> OutboundEnvelope {
        OutboundEnvelope {
            id: HANDSHAKE_ID,
            func: HANDSHAKE_FUNC.to_string(),
            args: vec![Value::String(BRIDGE_VERSION.to_string())],
            seq: None,
        }
    }

    /// Stamp dispatch order onto an envelope about to be handed to the
    /// transport.
    pub(crate) fn stamp(&mut self, envelope: &mut OutboundEnvelope) {
        envelope.seq = Some(self.next_seq);
        self.next_seq += 1;
    }

    /// Parse a raw inbound value into a response envelope.
    ///
    /// Returns `None` for anything malformed - not an object, missing or
    /// non-integer id. Malformed input is logged and dropped here; it is
    /// never routed to a callback and never crashes the dispatcher. A
    /// missing `args` field decodes as an empty argument list.
    pub(crate) fn decode(raw: &Value) -> Option<ResponseEnvelope> {
        let Some(object) = raw.as_object() else {
            warn!("Dropping inbound envelope: not an object");
            return None;
        };

        let Some(id) = object.get("id").and_then(Value::as_u64) else {
            warn!("Dropping inbound envelope: missing or non-integer id");
            return None;
        };

        let args = match object.get("args") {
            None => Vec::new(),
            Some(Value::Array(args)) => args.clone(),
            Some(_) => {
                warn!("Dropping inbound envelope for id {id}: args is not an array");
                return None;
            }
        };

        Some(ResponseEnvelope { id, args })
    }
}
