pub mod bridge;
pub mod files;
pub mod transport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Bridge(#[from] bridge::BridgeError),

    #[error(transparent)]
    Files(#[from] files::FilesError),

    #[error(transparent)]
    Transport(#[from] transport::TransportError),
}
