use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Failures reported by a [`HostTransport`](crate::transport::HostTransport)
/// implementation when posting an envelope.
///
/// The bridge does not retry: a send failure discards the associated pending
/// call and is logged. Delivery guarantees beyond the transport's own are
/// explicitly out of scope.
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },
}
