//! The bridge's dispatch actor.
//!
//! All shared bridge state (lifecycle, correlation table, outbound queue,
//! id counter) is owned by one task fed from an mpsc command channel. This
//! serializes every mutation and gives inbound responses a single dispatch
//! point, which is what the ordering guarantees rest on:
//!
//! - queued calls flush in enqueue order, exactly once, on `Ready`
//! - responses for one id reach the caller in arrival order
//! - no lock ordering to reason about, no races on the correlation table
//!
//! Reads that don't need the actor (current context, capability flags) go
//! through `Arc<RwLock<T>>` handles shared with [`Bridge`](super::Bridge).

use crate::bridge::context::{BridgeState, assert_allowed};
use crate::bridge::correlation::{CorrelationTable, PendingCall, StreamResponse};
use crate::bridge::envelope::EnvelopeCodec;
use crate::bridge::queue::{OutboundQueue, QueuedCall};
use crate::error::bridge::BridgeError;
use crate::transport::HostTransport;

use common::{FrameContext, HANDSHAKE_ID, OutboundEnvelope, ResponseEnvelope};

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use tokio::sync::{RwLock, mpsc, oneshot};

/// Commands accepted by the dispatch actor.
///
/// Every public `Bridge` operation maps to exactly one command; the reply
/// channels carry synchronous failures (`NotInitialized`,
/// `ContextViolation`) back to the caller before any envelope exists.
pub(crate) enum BridgeCommand {
    Initialize {
        notify: oneshot::Sender<FrameContext>,
    },
    Call {
        func: String,
        args: Vec<Value>,
        allowed: Vec<FrameContext>,
        reply: oneshot::Sender<Result<IssuedCall, BridgeError>>,
    },
    Subscribe {
        func: String,
        args: Vec<Value>,
        allowed: Vec<FrameContext>,
        reply: oneshot::Sender<Result<IssuedStream, BridgeError>>,
    },
    Notify {
        func: String,
        args: Vec<Value>,
        allowed: Vec<FrameContext>,
        reply: oneshot::Sender<Result<(), BridgeError>>,
    },
    Deliver {
        raw: Value,
    },
    Unsubscribe {
        id: u64,
    },
    Teardown {
        done: oneshot::Sender<()>,
    },
}

/// Receipt for an issued single-shot call.
pub(crate) struct IssuedCall {
    pub id: u64,
    pub rx: oneshot::Receiver<Vec<Value>>,
}

/// Receipt for an issued multi-shot subscription.
pub(crate) struct IssuedStream {
    pub id: u64,
    pub rx: mpsc::UnboundedReceiver<StreamResponse>,
}

pub(crate) struct BridgeActor {
    transport: Arc<dyn HostTransport>,
    state: BridgeState,
    codec: EnvelopeCodec,
    correlation: CorrelationTable,
    queue: OutboundQueue,
    /// Initialize callers waiting for the handshake acknowledgment.
    ready_waiters: Vec<oneshot::Sender<FrameContext>>,
    /// Shared with the `Bridge` handle for lock-free reads.
    context: Arc<RwLock<Option<FrameContext>>>,
    capabilities: Arc<RwLock<Option<Map<String, Value>>>>,
}

impl BridgeActor {
    pub(crate) fn new(
        transport: Arc<dyn HostTransport>,
        context: Arc<RwLock<Option<FrameContext>>>,
        capabilities: Arc<RwLock<Option<Map<String, Value>>>>,
    ) -> Self {
        Self {
            transport,
            state: BridgeState::Uninitialized,
            codec: EnvelopeCodec::new(),
            correlation: CorrelationTable::new(),
            queue: OutboundQueue::new(),
            ready_waiters: Vec::new(),
            context,
            capabilities,
        }
    }

    /// Process commands until every `Bridge` handle is dropped.
    pub(crate) async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<BridgeCommand>) {
        info!("Bridge actor started");

        while let Some(command) = command_rx.recv().await {
            match command {
                BridgeCommand::Initialize { notify } => self.initialize(notify).await,
                BridgeCommand::Call {
                    func,
                    args,
                    allowed,
                    reply,
                } => {
                    let _ = reply.send(self.call(&func, args, &allowed).await);
                }
                BridgeCommand::Subscribe {
                    func,
                    args,
                    allowed,
                    reply,
                } => {
                    let _ = reply.send(self.subscribe(&func, args, &allowed).await);
                }
                BridgeCommand::Notify {
                    func,
                    args,
                    allowed,
                    reply,
                } => {
                    let _ = reply.send(self.notify(&func, args, &allowed).await);
                }
                BridgeCommand::Deliver { raw } => self.deliver(&raw).await,
                BridgeCommand::Unsubscribe { id } => self.correlation.remove(id),
                BridgeCommand::Teardown { done } => {
                    self.teardown().await;
                    let _ = done.send(());
                }
            }
        }

        debug!("Bridge actor stopped: all handles dropped");
    }

    /// `Uninitialized → Initializing`: send the handshake and start waiting
    /// for the host's acknowledgment. Idempotent from `Initializing` and
    /// `Ready`; the existing handshake (or context) is reused.
    async fn initialize(&mut self, notify: oneshot::Sender<FrameContext>) {
        match self.state {
            BridgeState::Uninitialized | BridgeState::TornDown => {
                let mut envelope = self.codec.handshake();
                self.codec.stamp(&mut envelope);

                if let Err(e) = self.transport.post(&envelope) {
                    // Stay down; the caller can retry initialize.
                    error!("Failed to send handshake envelope: {e}");
                    return;
                }

                info!("Handshake sent; bridge is initializing");
                self.state = BridgeState::Initializing;
                self.ready_waiters.push(notify);
            }
            BridgeState::Initializing => {
                debug!("initialize() while initializing: joining existing handshake");
                self.ready_waiters.push(notify);
            }
            BridgeState::Ready => {
                if let Some(context) = *self.context.read().await {
                    let _ = notify.send(context);
                }
            }
        }
    }

    async fn call(
        &mut self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<IssuedCall, BridgeError> {
        let current = *self.context.read().await;
        assert_allowed(self.state, current, allowed)?;

        let envelope = self.codec.encode(func, args);
        let id = envelope.id;
        let (tx, rx) = oneshot::channel();

        self.dispatch(envelope, Some(PendingCall::Single(tx)));
        Ok(IssuedCall { id, rx })
    }

    async fn subscribe(
        &mut self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<IssuedStream, BridgeError> {
        let current = *self.context.read().await;
        assert_allowed(self.state, current, allowed)?;

        let envelope = self.codec.encode(func, args);
        let id = envelope.id;
        let (tx, rx) = mpsc::unbounded_channel();

        self.dispatch(envelope, Some(PendingCall::Streaming(tx)));
        Ok(IssuedStream { id, rx })
    }

    async fn notify(
        &mut self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<(), BridgeError> {
        let current = *self.context.read().await;
        assert_allowed(self.state, current, allowed)?;

        let envelope = self.codec.encode(func, args);
        self.dispatch(envelope, None);
        Ok(())
    }

    /// Send immediately when `Ready`, queue while `Initializing`.
    ///
    /// The pending call is registered at send time, never at enqueue time,
    /// so the correlation table only ever tracks envelopes the host has
    /// actually been handed.
    fn dispatch(&mut self, envelope: OutboundEnvelope, pending: Option<PendingCall>) {
        match self.state {
            BridgeState::Ready => self.send(envelope, pending),
            BridgeState::Initializing => {
                debug!(
                    "Queueing '{}' (id {}) until the handshake resolves",
                    envelope.func, envelope.id
                );
                self.queue.enqueue(QueuedCall { envelope, pending });
            }
            // dispatch() is only reachable after assert_allowed.
            BridgeState::Uninitialized | BridgeState::TornDown => {
                warn!("Dropping envelope built while the bridge was down");
            }
        }
    }

    fn send(&mut self, mut envelope: OutboundEnvelope, pending: Option<PendingCall>) {
        let id = envelope.id;
        if let Some(pending) = pending {
            self.correlation.register(id, pending);
        }

        self.codec.stamp(&mut envelope);
        if let Err(e) = self.transport.post(&envelope) {
            // No retry at this layer. Dropping the pending call closes the
            // caller's channel, which surfaces as `Discarded`.
            error!("Failed to send envelope id {id}: {e}");
            self.correlation.remove(id);
        }
    }

    /// Inbound dispatch: decode, then route to the handshake handler or the
    /// correlation table. Malformed input is dropped inside the codec.
    async fn deliver(&mut self, raw: &Value) {
        let Some(ResponseEnvelope { id, args }) = EnvelopeCodec::decode(raw) else {
            return;
        };

        if id == HANDSHAKE_ID {
            self.handshake_ack(args).await;
        } else {
            self.correlation.resolve(id, args);
        }
    }

    /// `Initializing → Ready`: record the negotiated context and capability
    /// flags, flush the queue in enqueue order, resolve initialize waiters.
    async fn handshake_ack(&mut self, args: Vec<Value>) {
        if self.state != BridgeState::Initializing {
            warn!("Dropping handshake acknowledgment in state {:?}", self.state);
            return;
        }

        let Some(context) = args
            .first()
            .and_then(Value::as_str)
            .and_then(FrameContext::from_tag)
        else {
            warn!("Dropping handshake acknowledgment with unknown context tag: {args:?}");
            return;
        };

        let capabilities = args.get(1).and_then(Value::as_object).cloned();

        *self.context.write().await = Some(context);
        *self.capabilities.write().await = capabilities;
        self.state = BridgeState::Ready;
        info!(
            "Bridge ready in '{context}' context; flushing {} queued call(s)",
            self.queue.len()
        );

        for QueuedCall { envelope, pending } in self.queue.drain() {
            self.send(envelope, pending);
        }

        for waiter in self.ready_waiters.drain(..) {
            let _ = waiter.send(context);
        }
    }

    /// Synchronous teardown: discard (never resolve) every pending call and
    /// queued envelope, clear the negotiated context, and go down. The id
    /// counter is deliberately left alone so ids are never reused within
    /// the process.
    async fn teardown(&mut self) {
        info!(
            "Tearing down bridge: discarding {} pending call(s), {} queued call(s)",
            self.correlation.len(),
            self.queue.len()
        );

        *self.context.write().await = None;
        *self.capabilities.write().await = None;
        self.correlation.clear();
        self.queue.clear();
        self.ready_waiters.clear();
        self.state = BridgeState::TornDown;
    }
}
