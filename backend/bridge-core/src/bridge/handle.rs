//! Public handle to the bridge.
//!
//! [`Bridge`] is a cheap clone over one shared dispatch actor; every call
//! wrapper across the application talks to the same instance. There is no
//! hidden global: the embedding application constructs the bridge with its
//! transport and passes it to whoever needs it.

use crate::bridge::actor::{BridgeActor, BridgeCommand};
use crate::bridge::correlation::StreamResponse;
use crate::error::bridge::BridgeError;
use crate::transport::HostTransport;

use common::FrameContext;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use log::warn;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, mpsc, oneshot};

/// The cross-context RPC bridge.
///
/// Public operations never block waiting for the host: `call` and
/// `subscribe` validate synchronously and hand back a future/stream that
/// resolves when (if ever) the host replies. There is no timeout at this
/// layer - a request with no response waits until the caller gives up or
/// the bridge tears down.
#[derive(Clone)]
pub struct Bridge {
    command_tx: mpsc::UnboundedSender<BridgeCommand>,
    context: Arc<RwLock<Option<FrameContext>>>,
    capabilities: Arc<RwLock<Option<Map<String, Value>>>>,
}

impl Bridge {
    /// Construct a bridge over the given transport and spawn its dispatch
    /// actor. Must be called within a tokio runtime.
    pub fn new(transport: Arc<dyn HostTransport>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let context = Arc::new(RwLock::new(None));
        let capabilities = Arc::new(RwLock::new(None));

        let actor = BridgeActor::new(transport, Arc::clone(&context), Arc::clone(&capabilities));
        tokio::spawn(actor.run(command_rx));

        Self {
            command_tx,
            context,
            capabilities,
        }
    }

    /// Begin (or join) the handshake with the host.
    ///
    /// Idempotent: calling again while `Initializing` or `Ready` reuses the
    /// existing handshake. The returned future resolves with the negotiated
    /// [`FrameContext`] once the host acknowledges; there is no timeout at
    /// this layer, so if the host never responds the future never resolves.
    /// If the bridge tears down first it resolves with `Discarded`.
    pub fn initialize(&self) -> InitFuture {
        let (notify, rx) = oneshot::channel();
        self.send_command(BridgeCommand::Initialize { notify });
        InitFuture { rx }
    }

    /// Issue a single-shot call.
    ///
    /// Fails synchronously with `NotInitialized` or `ContextViolation`
    /// before any envelope is built. On success the returned [`CallFuture`]
    /// resolves with the host's positional response arguments; by
    /// convention the first is the error slot, which this layer does not
    /// interpret.
    pub async fn call(
        &self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<CallFuture, BridgeError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command(BridgeCommand::Call {
            func: func.to_string(),
            args,
            allowed: allowed.to_vec(),
            reply,
        })?;

        let issued = reply_rx
            .await
            .map_err(|_| BridgeError::closed("bridge actor is gone"))??;
        Ok(CallFuture {
            id: issued.id,
            rx: issued.rx,
        })
    }

    /// Issue a multi-shot call: one request, an open-ended stream of
    /// responses. The subscription stays live until a terminal response,
    /// [`Bridge::unsubscribe`], or teardown.
    pub async fn subscribe(
        &self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<Subscription, BridgeError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command(BridgeCommand::Subscribe {
            func: func.to_string(),
            args,
            allowed: allowed.to_vec(),
            reply,
        })?;

        let issued = reply_rx
            .await
            .map_err(|_| BridgeError::closed("bridge actor is gone"))??;
        Ok(Subscription {
            id: issued.id,
            rx: issued.rx,
        })
    }

    /// Fire-and-forget: send (or queue) an envelope, register nothing.
    pub async fn notify(
        &self,
        func: &str,
        args: Vec<Value>,
        allowed: &[FrameContext],
    ) -> Result<(), BridgeError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command(BridgeCommand::Notify {
            func: func.to_string(),
            args,
            allowed: allowed.to_vec(),
            reply,
        })?;

        reply_rx
            .await
            .map_err(|_| BridgeError::closed("bridge actor is gone"))?
    }

    /// Remove a streaming subscription by id. Responses arriving afterwards
    /// are dropped like any other unknown id.
    pub fn unsubscribe(&self, id: u64) {
        self.send_command(BridgeCommand::Unsubscribe { id });
    }

    /// Tear the bridge down: discard every pending and queued call, clear
    /// the negotiated context, reset. Completes once the actor has actually
    /// done so. Discarded callers observe a closed channel, never a
    /// response.
    pub async fn teardown(&self) {
        let (done, done_rx) = oneshot::channel();
        self.send_command(BridgeCommand::Teardown { done });
        let _ = done_rx.await;
    }

    /// Feed one raw inbound value from the host transport into the
    /// dispatcher. Malformed values are logged and dropped inside.
    pub fn deliver(&self, raw: Value) {
        self.send_command(BridgeCommand::Deliver { raw });
    }

    /// The context negotiated by the handshake, or `None` before `Ready`
    /// and after teardown.
    pub async fn current_context(&self) -> Option<FrameContext> {
        *self.context.read().await
    }

    /// Capability flags the host attached to its handshake acknowledgment.
    pub async fn capabilities(&self) -> Option<Map<String, Value>> {
        self.capabilities.read().await.clone()
    }

    fn command(&self, command: BridgeCommand) -> Result<(), BridgeError> {
        self.command_tx
            .send(command)
            .map_err(|_| BridgeError::closed("bridge actor is gone"))
    }

    fn send_command(&self, command: BridgeCommand) {
        if self.command_tx.send(command).is_err() {
            warn!("Bridge command dropped: actor is gone");
        }
    }
}

/// Resolves with the negotiated [`FrameContext`] once the handshake
/// completes, or `Discarded` if the bridge tears down (or dies) first.
pub struct InitFuture {
    rx: oneshot::Receiver<FrameContext>,
}

impl Future for InitFuture {
    type Output = Result<FrameContext, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| BridgeError::discarded()))
    }
}

/// Resolves with the host's positional response arguments, or `Discarded`
/// if the bridge tears down before the response arrives.
pub struct CallFuture {
    id: u64,
    rx: oneshot::Receiver<Vec<Value>>,
}

impl CallFuture {
    /// The envelope id this call was issued under.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for CallFuture {
    type Output = Result<Vec<Value>, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| BridgeError::discarded()))
    }
}

/// Live multi-shot subscription.
///
/// Responses arrive strictly in the order the host sent them. `recv`
/// returns `None` once the stream is over: after a terminal response has
/// been yielded, after [`Bridge::unsubscribe`], or after teardown. Dropping
/// the subscription also ends it; the bridge notices on the next matching
/// response and removes the entry.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<StreamResponse>,
}

impl Subscription {
    /// The envelope id this subscription was issued under; pass it to
    /// [`Bridge::unsubscribe`] to end the stream explicitly.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<StreamResponse> {
        self.rx.recv().await
    }
}
