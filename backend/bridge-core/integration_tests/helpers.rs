//! Shared helpers for bridge integration tests.
//!
//! `HostStub` plays the host side of the wire: it records every envelope
//! the bridge posts and lets a test reply to any of them by id. Inbound
//! delivery goes through the public `Bridge::deliver` entry point, exactly
//! like production transport glue.

use bridge_core::bridge::Bridge;
use bridge_core::error::transport::TransportError;
use bridge_core::transport::HostTransport;

use common::{ErrorLocation, FrameContext, HANDSHAKE_ID, OutboundEnvelope};

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

/// Recording transport standing in for the host.
#[derive(Default)]
pub struct HostStub {
    messages: Mutex<Vec<OutboundEnvelope>>,
    fail_sends: AtomicBool,
}

impl HostStub {
    /// Every envelope posted so far, in dispatch order.
    pub fn messages(&self) -> Vec<OutboundEnvelope> {
        self.messages.lock().expect("messages lock").clone()
    }

    /// The first recorded envelope for `func`, mirroring how the original
    /// host-side tests locate a request.
    pub fn find_message_by_func(&self, func: &str) -> Option<OutboundEnvelope> {
        self.messages().into_iter().find(|m| m.func == func)
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().expect("messages lock").len()
    }

    /// Make every subsequent post fail, simulating a dead transport.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }
}

impl HostTransport for HostStub {
    fn post(&self, envelope: &OutboundEnvelope) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send {
                message: "host stub is refusing sends".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.messages
            .lock()
            .expect("messages lock")
            .push(envelope.clone());
        Ok(())
    }
}

pub fn new_bridge() -> (Bridge, Arc<HostStub>) {
    let host = Arc::new(HostStub::default());
    let bridge = Bridge::new(Arc::clone(&host) as Arc<dyn HostTransport>);
    (bridge, host)
}

/// Reply to a request by id with the given positional args.
pub fn respond(bridge: &Bridge, id: u64, args: Value) {
    bridge.deliver(json!({ "id": id, "args": args }));
}

/// Acknowledge the handshake, optionally attaching capability flags.
pub fn acknowledge_handshake(bridge: &Bridge, context_tag: &str, capabilities: Option<Value>) {
    let args = match capabilities {
        Some(capabilities) => json!([context_tag, capabilities]),
        None => json!([context_tag]),
    };
    bridge.deliver(json!({ "id": HANDSHAKE_ID, "args": args }));
}

/// Drive the bridge to `Ready` in the given context.
pub async fn initialize_with_context(bridge: &Bridge, context_tag: &str) -> FrameContext {
    let ready = bridge.initialize();
    acknowledge_handshake(bridge, context_tag, None);
    ready.await.expect("handshake should resolve")
}

/// Give the dispatch actor a moment to process fire-and-forget commands
/// (`deliver`, `unsubscribe`) that have no reply to await.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}
