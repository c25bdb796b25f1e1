//! Membership listener: answers join requests from new nodes.
//!
//! One request and one reply per connection. Connections are handled one at
//! a time unless `concurrent` is set, in which case each gets its own task.

use std::net::SocketAddr;
use std::time::Duration;

use muster_common::constants::{DEFAULT_BIND_HOST, DEFAULT_REQUEST_TIMEOUT_SECS};
use muster_common::{HandshakeMessage, MusterError, NodeIdentity};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use super::codec;

/// Membership listener configuration
#[derive(Clone, Debug)]
pub struct ListenerConfig {
    /// Interface to bind; the port comes from the node identity
    pub bind_host: String,
    /// Handle each connection on its own task
    pub concurrent: bool,
    /// How long an accepted peer may take to send its request
    pub request_timeout: Option<Duration>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            concurrent: false,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

/// Server side of the join handshake
pub struct MembershipListener {
    me: NodeIdentity,
    config: ListenerConfig,
    /// Receives every join request that was answered
    joiners: Option<mpsc::UnboundedSender<HandshakeMessage>>,
}

impl MembershipListener {
    pub fn new(me: NodeIdentity, config: ListenerConfig) -> Self {
        Self {
            me,
            config,
            joiners: None,
        }
    }

    /// Forward each answered join request to `feed`
    pub fn with_joiner_feed(mut self, feed: mpsc::UnboundedSender<HandshakeMessage>) -> Self {
        self.joiners = Some(feed);
        self
    }

    /// Bind the listening socket on `bind_host:me.port`
    pub async fn bind(&self) -> Result<TcpListener, MusterError> {
        let addr = format!("{}:{}", self.config.bind_host, self.me.port);
        TcpListener::bind(&addr)
            .await
            .map_err(|source| MusterError::Bind { addr, source })
    }

    /// Bind, then answer joiners until the process ends.
    ///
    /// Only a bind failure makes this return.
    pub async fn serve(self) -> Result<(), MusterError> {
        let listener = self.bind().await?;
        self.run(listener).await;
        Ok(())
    }

    /// Accept loop over an already bound socket. Never returns.
    pub async fn run(self, listener: TcpListener) {
        tracing::info!(
            node_id = self.me.id,
            addr = ?listener.local_addr().ok(),
            concurrent = self.config.concurrent,
            "👂 Membership listener started"
        );

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(node_id = self.me.id, error = %e, "Error received while listening");
                    continue;
                }
            };

            if self.config.concurrent {
                let me = self.me.clone();
                let timeout = self.config.request_timeout;
                let joiners = self.joiners.clone();
                tokio::spawn(async move {
                    let result = handle_connection(&me, stream, timeout).await;
                    report(joiners.as_ref(), peer, result);
                });
            } else {
                let result =
                    handle_connection(&self.me, stream, self.config.request_timeout).await;
                report(self.joiners.as_ref(), peer, result);
            }
        }
    }
}

fn report(
    joiners: Option<&mpsc::UnboundedSender<HandshakeMessage>>,
    peer: SocketAddr,
    result: Result<HandshakeMessage, MusterError>,
) {
    match result {
        Ok(request) => {
            if let Some(feed) = joiners {
                // Nobody listening any more is fine
                let _ = feed.send(request);
            }
        }
        Err(e) => tracing::warn!(peer = %peer, error = %e, "Join handshake failed"),
    }
}

/// Answer a single join request; the connection closes when this returns.
async fn handle_connection(
    me: &NodeIdentity,
    mut stream: TcpStream,
    request_timeout: Option<Duration>,
) -> Result<HandshakeMessage, MusterError> {
    let request = codec::read_message(&mut stream, request_timeout).await?;
    tracing::info!("Got request:\n{request}");

    let reply = if request.source.id == me.id {
        tracing::warn!(node_id = me.id, "Joiner reused our node id, rejecting");
        HandshakeMessage::id_collision(me.clone(), request.source.clone())
    } else {
        HandshakeMessage::acknowledge(me.clone(), request.source.clone())
    };
    codec::write_message(&mut stream, &reply).await?;

    tracing::debug!(joiner = request.source.id, "Joiner acknowledged");
    Ok(request)
}
