//! # Muster node library
//!
//! The join handshake client, the membership listener, the fallback
//! decision, and the configuration that wires them together.
//!
//! ## Modules
//! - `cluster` - Join client, membership listener, bootstrap fallback
//! - `config` - Layered configuration (file, env, CLI)
//! - `cli` - Command-line arguments
//! - `net` - Advertised address discovery

pub mod cli;
pub mod cluster;
pub mod config;
pub mod net;
