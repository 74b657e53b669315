use crate::error::bridge::BridgeError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures raised by the `files` call wrappers.
///
/// `Validation` is produced before any call reaches the bridge core;
/// `Host` carries the error slot the host set in its reply; `Response`
/// means the host replied with a payload we could not decode.
#[derive(Debug, ThisError)]
pub enum FilesError {
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    #[error("Response Error: {message} {location}")]
    Response {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl FilesError {
    #[track_caller]
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for FilesError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        FilesError::Response {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
