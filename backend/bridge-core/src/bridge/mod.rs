//! The cross-context RPC bridge.
//!
//! Code running inside a hosted frame has no trusted execution environment
//! of its own; privileged actions are delegated to the host application
//! over an asynchronous, untyped transport. This module is the runtime
//! underneath every such call:
//!
//! - lifecycle state machine tracking the handshake with the host
//! - permission gate over the negotiated [`FrameContext`](common::FrameContext)
//! - envelope codec assigning correlated request ids
//! - correlation table mapping in-flight ids to waiting callers
//! - FIFO queue for calls issued before the host is ready
//! - dispatcher routing inbound responses back to callers, including
//!   multi-shot stream semantics
//!
//! # Architecture
//!
//! All mutable state lives in a single actor task ([`actor`]); public
//! operations are commands sent over a channel, which is what serializes
//! access and preserves the ordering guarantees. See [`Bridge`] for the
//! public surface.

pub(crate) mod actor;
pub(crate) mod context;
pub(crate) mod correlation;
pub(crate) mod envelope;
mod handle;
pub(crate) mod queue;

pub use correlation::StreamResponse;
pub use handle::{Bridge, CallFuture, InitFuture, Subscription};
