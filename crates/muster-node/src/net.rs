//! Local address discovery.
//!
//! The advertised address comes from `--my-ip` when given. Otherwise it is
//! the local address the OS would route through to reach the target.

use std::net::IpAddr;

use muster_common::NodeIdentity;
use tokio::net::UdpSocket;

const LOOPBACK: &str = "127.0.0.1";

/// Address this node advertises to the cluster
pub async fn advertised_address(override_ip: Option<&str>, target: &NodeIdentity) -> String {
    if let Some(ip) = override_ip {
        return ip.to_string();
    }

    match route_local_ip(target).await {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            tracing::warn!(
                target_endpoint = %target.endpoint(),
                error = %e,
                "Could not discover local address, advertising loopback"
            );
            LOOPBACK.to_string()
        }
    }
}

/// Connecting a UDP socket picks a route without sending anything.
async fn route_local_ip(target: &NodeIdentity) -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(target.endpoint()).await?;
    Ok(socket.local_addr()?.ip())
}
