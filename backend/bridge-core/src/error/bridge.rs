use common::{ErrorLocation, FrameContext};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures raised by the bridge core itself.
///
/// `NotInitialized` and `ContextViolation` are synchronous: they are raised
/// at call time, before any envelope is built, and never reach the host.
/// `NotInitialized` takes precedence when both would apply.
#[derive(Debug, ThisError)]
pub enum BridgeError {
    #[error("The library has not yet been initialized {location}")]
    NotInitialized { location: ErrorLocation },

    #[error("This call is not allowed in the '{context}' context {location}")]
    ContextViolation {
        context: FrameContext,
        location: ErrorLocation,
    },

    #[error("Call discarded: the bridge tore down before the host responded {location}")]
    Discarded { location: ErrorLocation },

    #[error("Bridge closed: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub(crate) fn not_initialized() -> Self {
        Self::NotInitialized {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn context_violation(context: FrameContext) -> Self {
        Self::ContextViolation {
            context,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn discarded() -> Self {
        Self::Discarded {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn closed(message: impl Into<String>) -> Self {
        Self::Closed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
