//! In-flight call tracking and response dispatch.
//!
//! One entry per request id, inserted when the envelope is handed to the
//! transport (not when it is queued) and removed when the call resolves,
//! the stream terminates, the subscriber goes away, or the bridge tears
//! down. Late, duplicate, or unknown-id responses fall through to a log
//! line and nothing else.

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// One response in a multi-shot stream.
///
/// `terminal` is derived from the leading boolean the host sends with every
/// stream response ("more will follow"); after a terminal response the
/// subscription is gone and further responses for the id are dropped.
#[derive(Debug)]
pub struct StreamResponse {
    pub args: Vec<Value>,
    pub terminal: bool,
}

/// A call waiting on the host, tagged by multiplicity.
pub(crate) enum PendingCall {
    /// Resolves exactly once; the sender is consumed on delivery.
    Single(oneshot::Sender<Vec<Value>>),

    /// Delivers every matching response until a terminal one arrives, the
    /// subscriber drops its receiver, or the bridge tears down.
    Streaming(mpsc::UnboundedSender<StreamResponse>),
}

#[derive(Default)]
pub(crate) struct CorrelationTable {
    entries: HashMap<u64, PendingCall>,
}

impl CorrelationTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a pending call under its envelope id.
    ///
    /// Ids come from a monotonic counter, so a collision means an internal
    /// bug; the stale entry is replaced and the event logged rather than
    /// panicking the dispatch task.
    pub(crate) fn register(&mut self, id: u64, pending: PendingCall) {
        if self.entries.insert(id, pending).is_some() {
            warn!("Replaced an existing pending call for id {id}; this is a bug");
        }
    }

    /// Route one inbound response to its waiting caller.
    ///
    /// Single-shot: deliver the full argument list once and drop the entry.
    /// Multi-shot: pop the leading stream flag, deliver, and keep the entry
    /// alive while the flag says more responses follow.
    pub(crate) fn resolve(&mut self, id: u64, mut args: Vec<Value>) {
        let Some(pending) = self.entries.remove(&id) else {
            debug!("Dropping response for unknown id {id} (late, duplicate, or after teardown)");
            return;
        };

        match pending {
            PendingCall::Single(sender) => {
                if sender.send(args).is_err() {
                    debug!("Caller for id {id} went away before the response arrived");
                }
            }
            PendingCall::Streaming(sender) => {
                let Some(more) = first_as_bool(&mut args) else {
                    warn!("Dropping stream response for id {id}: missing leading flag");
                    self.entries.insert(id, PendingCall::Streaming(sender));
                    return;
                };

                let delivered = sender
                    .send(StreamResponse {
                        args,
                        terminal: !more,
                    })
                    .is_ok();

                if !delivered {
                    debug!("Subscriber for id {id} went away; removing stream entry");
                } else if more {
                    self.entries.insert(id, PendingCall::Streaming(sender));
                }
            }
        }
    }

    /// Drop a streaming entry on explicit unregistration.
    pub(crate) fn remove(&mut self, id: u64) {
        if self.entries.remove(&id).is_some() {
            debug!("Unregistered pending call for id {id}");
        }
    }

    /// Discard every pending call. Dropping the senders closes the callers'
    /// channels; nothing is resolved. Teardown-only.
    pub(crate) fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("Discarding {} pending call(s)", self.entries.len());
        }
        self.entries.clear();
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Pop the leading boolean off a stream response's argument list.
fn first_as_bool(args: &mut Vec<Value>) -> Option<bool> {
    match args.first() {
        Some(Value::Bool(flag)) => {
            let flag = *flag;
            args.remove(0);
            Some(flag)
        }
        _ => None,
    }
}
