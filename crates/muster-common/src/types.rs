//! Core types shared across Muster components.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{texts, MAX_NODE_ID};
use crate::error::MusterError;

/// Identity of a node: who it is and where it listens.
///
/// No validation is done on `address` or `port`; a bad value shows up as a
/// connection failure when something dials it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Node id, drawn at random on startup unless configured
    pub id: i64,

    /// Advertised host or IP
    #[serde(rename = "addr")]
    pub address: String,

    /// Listen port, kept as text
    pub port: String,
}

impl NodeIdentity {
    pub fn new(id: i64, address: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            port: port.into(),
        }
    }

    /// Parse an `address:port` endpoint.
    ///
    /// Exactly one `:` is accepted, and neither side may be empty.
    pub fn from_endpoint(id: i64, endpoint: &str) -> Result<Self, MusterError> {
        let mut parts = endpoint.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(address), Some(port), None) if !address.is_empty() && !port.is_empty() => {
                Ok(Self::new(id, address, port))
            }
            _ => Err(MusterError::InvalidEndpoint(endpoint.to_string())),
        }
    }

    /// Draw a fresh random id in `[0, MAX_NODE_ID)`
    pub fn generate_id() -> i64 {
        rand::rng().random_range(0..MAX_NODE_ID)
    }

    /// `address:port`, suitable for dialing
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node {{")?;
        writeln!(f, "  Id: {}", self.id)?;
        writeln!(f, "  Addr: {}", self.address)?;
        writeln!(f, "  Port: {}", self.port)?;
        write!(f, "}}")
    }
}

/// Handshake envelope exchanged once in each direction per connection.
///
/// Join requests and acknowledgments share this shape; only the payload text
/// and the direction tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeMessage {
    pub source: NodeIdentity,
    pub dest: NodeIdentity,

    /// Free-text payload
    #[serde(rename = "message")]
    pub text: String,
}

impl HandshakeMessage {
    pub fn new(source: NodeIdentity, dest: NodeIdentity, text: impl Into<String>) -> Self {
        Self {
            source,
            dest,
            text: text.into(),
        }
    }

    /// Join request from `source` to `dest`
    pub fn request(source: NodeIdentity, dest: NodeIdentity) -> Self {
        Self::new(source, dest, texts::JOIN_REQUEST)
    }

    /// Acknowledgment from cluster member `source` to joiner `dest`
    pub fn acknowledge(source: NodeIdentity, dest: NodeIdentity) -> Self {
        Self::new(source, dest, texts::JOIN_ACK)
    }

    /// Rejection sent when the joiner claims the member's own id
    pub fn id_collision(source: NodeIdentity, dest: NodeIdentity) -> Self {
        Self::new(source, dest, texts::JOIN_ID_COLLISION)
    }

    pub fn is_id_collision(&self) -> bool {
        self.text == texts::JOIN_ID_COLLISION
    }

    /// Encode as a single newline-terminated JSON frame
    pub fn encode(&self) -> Result<Vec<u8>, MusterError> {
        let mut bytes =
            serde_json::to_vec(self).map_err(|e| MusterError::Encode(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decode one frame. Trailing whitespace (the frame newline) is ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, MusterError> {
        let end = bytes
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        if end == 0 {
            return Err(MusterError::Decode("empty handshake frame".to_string()));
        }
        Ok(serde_json::from_slice(&bytes[..end])?)
    }
}

impl fmt::Display for HandshakeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HandshakeMessage {{")?;
        writeln!(f, "  Source: {}", self.source)?;
        writeln!(f, "  Dest: {}", self.dest)?;
        writeln!(f, "  Message: {}", self.text)?;
        write!(f, "}}")
    }
}

/// Role a node settled into after bootstrapping.
///
/// Master is a local assertion only; nothing in the cluster arbitrates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Joined through an existing cluster node
    Member,
    /// Declared itself master after failing to join
    Master,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => f.write_str("member"),
            Self::Master => f.write_str("master"),
        }
    }
}
