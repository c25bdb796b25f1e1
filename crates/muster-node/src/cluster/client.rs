//! Join client: dial one cluster node and exchange a single handshake.

use std::future::Future;
use std::io;
use std::time::Duration;

use muster_common::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REPLY_TIMEOUT_SECS};
use muster_common::{HandshakeMessage, MusterError, NodeIdentity};
use thiserror::Error;
use tokio::net::TcpStream;

use super::codec;

/// Join client configuration
#[derive(Clone, Debug)]
pub struct JoinConfig {
    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the acknowledgment (`None` waits forever)
    pub reply_timeout: Option<Duration>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            reply_timeout: Some(Duration::from_secs(DEFAULT_REPLY_TIMEOUT_SECS)),
        }
    }
}

/// Why a join attempt failed
#[derive(Debug, Error)]
pub enum JoinError {
    /// Nothing accepted the connection in time
    #[error("Cluster node {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The cluster node answered, but it already owns our id
    #[error("Node id {0} is already in use by the cluster node")]
    IdCollision(i64),

    /// Connected, but the exchange itself failed
    #[error("Handshake failed: {0}")]
    Protocol(#[from] MusterError),
}

impl JoinError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Client side of the join handshake
#[derive(Clone, Debug, Default)]
pub struct JoinClient {
    config: JoinConfig,
}

impl JoinClient {
    pub fn new(config: JoinConfig) -> Self {
        Self { config }
    }

    /// Try to join through `target`; `true` once an acknowledgment came back.
    pub async fn join(&self, me: &NodeIdentity, target: &NodeIdentity) -> bool {
        joined(me, &self.try_join(me, target).await)
    }

    /// Dial `target`, send a join request, and return its acknowledgment.
    ///
    /// No retries: any failure is returned straight away.
    pub async fn try_join(
        &self,
        me: &NodeIdentity,
        target: &NodeIdentity,
    ) -> Result<HandshakeMessage, JoinError> {
        let endpoint = target.endpoint();

        let mut stream = connect_within(
            &endpoint,
            self.config.connect_timeout,
            TcpStream::connect(&endpoint),
        )
        .await?;

        tracing::info!(endpoint = %endpoint, "Connected to cluster");

        let request = HandshakeMessage::request(me.clone(), target.clone());
        codec::write_message(&mut stream, &request).await?;

        let reply = codec::read_message(&mut stream, self.config.reply_timeout).await?;
        tracing::info!("Got response:\n{reply}");

        if reply.is_id_collision() {
            return Err(JoinError::IdCollision(me.id));
        }

        Ok(reply)
    }
}

/// Log a join result and reduce it to joined / not joined.
pub fn joined(me: &NodeIdentity, result: &Result<HandshakeMessage, JoinError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.is_unreachable() => {
            tracing::info!(node_id = me.id, error = %e, "Unable to connect to cluster");
            false
        }
        Err(e) => {
            tracing::warn!(node_id = me.id, error = %e, "Join handshake failed");
            false
        }
    }
}

/// Await `connect`, mapping both a refusal and the deadline to `Unreachable`.
async fn connect_within<F>(endpoint: &str, limit: Duration, connect: F) -> Result<TcpStream, JoinError>
where
    F: Future<Output = io::Result<TcpStream>>,
{
    match tokio::time::timeout(limit, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(JoinError::Unreachable {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(JoinError::Unreachable {
            endpoint: endpoint.to_string(),
            reason: format!("connect timed out after {limit:?}"),
        }),
    }
}
