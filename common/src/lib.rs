//! Shared data models for the host bridge.
//!
//! This crate contains pure data structures representing the core
//! concepts in our application. Models have no business logic - they're
//! just data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure data structures
//! - **bridge-core**: The RPC bridge operating on these models
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod envelope;
pub mod error;
pub mod frame_context;

pub use envelope::{HANDSHAKE_ID, OutboundEnvelope, ResponseEnvelope};
pub use error::error_location::ErrorLocation;
pub use frame_context::FrameContext;
