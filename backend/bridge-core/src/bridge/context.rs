//! Lifecycle states and the permission gate.

use crate::error::bridge::BridgeError;

use common::FrameContext;

/// Overall state of the bridge, owned by the dispatch actor.
///
/// `Uninitialized → Initializing → Ready`, with `TornDown` reachable from
/// any state via [`Bridge::teardown`](crate::bridge::Bridge::teardown).
/// `TornDown` gates identically to `Uninitialized`; `initialize()` from
/// either starts a fresh handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BridgeState {
    Uninitialized,
    Initializing,
    Ready,
    TornDown,
}

/// Check whether a call is permitted right now.
///
/// Declared-context sets are data owned by the call wrapper layer; this is a
/// pure membership check. An empty `allowed` set means "any context".
///
/// Ordering matters: initialization failure takes precedence over context
/// failure. While `Initializing` the context is not yet known, so the check
/// passes and the call queues behind the handshake.
pub(crate) fn assert_allowed(
    state: BridgeState,
    current: Option<FrameContext>,
    allowed: &[FrameContext],
) -> Result<(), BridgeError> {
    match state {
        BridgeState::Uninitialized | BridgeState::TornDown => Err(BridgeError::not_initialized()),
        BridgeState::Initializing => Ok(()),
        BridgeState::Ready => match current {
            Some(context) if allowed.is_empty() || allowed.contains(&context) => Ok(()),
            Some(context) => Err(BridgeError::context_violation(context)),
            // Ready without a context cannot happen through the actor;
            // treat it like an incomplete handshake if it ever does.
            None => Err(BridgeError::not_initialized()),
        },
    }
}
