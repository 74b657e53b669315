//! FIFO queue for calls issued before the handshake completes.
//!
//! While the bridge is `Initializing` every outbound envelope lands here
//! instead of the transport. The pending call travels with its envelope and
//! is only registered with the correlation table at flush time, so the
//! table never holds an entry for an envelope the host has not seen.

use crate::bridge::correlation::PendingCall;

use common::OutboundEnvelope;

use std::collections::VecDeque;

pub(crate) struct QueuedCall {
    pub envelope: OutboundEnvelope,
    /// `None` for fire-and-forget notifications.
    pub pending: Option<PendingCall>,
}

#[derive(Default)]
pub(crate) struct OutboundQueue {
    calls: VecDeque<QueuedCall>,
}

impl OutboundQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enqueue(&mut self, call: QueuedCall) {
        self.calls.push_back(call);
    }

    /// Take every queued call, in original enqueue order. Called exactly
    /// once per handshake, on the `Initializing → Ready` transition.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = QueuedCall> + use<> {
        std::mem::take(&mut self.calls).into_iter()
    }

    /// Discard everything without sending. Teardown-only.
    pub(crate) fn clear(&mut self) {
        self.calls.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.calls.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
