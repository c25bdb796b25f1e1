//! # Muster Common
//!
//! Shared types used by every Muster node.
//!
//! ## Modules
//! - `types` - Node identity and the handshake wire message
//! - `error` - Common error types
//! - `constants` - Protocol constants and defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::MusterError;
pub use types::*;
