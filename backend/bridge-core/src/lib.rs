pub mod bridge;
pub mod error;
pub mod files;
pub mod transport;


/// Reserved operation name for the handshake envelope sent on initialize.
pub const HANDSHAKE_FUNC: &str = "initialize";

/// Library version reported to the host in the handshake envelope.
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");
