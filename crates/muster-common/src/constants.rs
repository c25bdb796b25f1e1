//! Shared constants for Muster components.

/// Default cluster endpoint to dial when none is configured
pub const DEFAULT_CLUSTER_IP: &str = "127.0.0.1:8001";

/// Default port this node listens on
pub const DEFAULT_MY_PORT: &str = "8001";

/// Default interface the membership listener binds to
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Connect timeout when dialing a cluster node (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Time allowed for the peer's reply once connected (seconds)
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 10;

/// Time the listener waits for a request on an accepted connection (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Id used for a target whose identity is not known yet
pub const UNKNOWN_NODE_ID: i64 = -1;

/// Exclusive upper bound for generated node ids (2^53, exact in any JSON number)
pub const MAX_NODE_ID: i64 = 1 << 53;

/// Largest handshake frame accepted on the wire
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Handshake payload texts
pub mod texts {
    /// Sent by a node asking to join
    pub const JOIN_REQUEST: &str = "join request";

    /// Sent back by a cluster member accepting the joiner
    pub const JOIN_ACK: &str = "added to cluster";

    /// Sent back when the joiner reuses the member's own id
    pub const JOIN_ID_COLLISION: &str = "node id already in use";
}
