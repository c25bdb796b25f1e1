//! Cluster membership handshake.
//!
//! Implements:
//! - Join client (dial a member, one request/acknowledgment exchange)
//! - Membership listener (answer joiners, one connection at a time)
//! - Bootstrap fallback (member, self-declared master, or exit)

mod bootstrap;
mod client;
mod codec;
mod listener;

pub use bootstrap::{FallbackCoordinator, decide};
pub use client::{JoinClient, JoinConfig, JoinError, joined};
pub use listener::{ListenerConfig, MembershipListener};

/// Reserve a loopback port that nothing listens on.
#[cfg(test)]
pub(crate) async fn unused_port() -> String {
    let socket = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap().port().to_string()
}
