//! # Muster node
//!
//! Joins a cluster through any live member with a single handshake, then
//! listens for nodes that want to join through it. When no member answers
//! the node can declare itself master instead.
//!
//! ## Flow
//! ```text
//! join(target) ──ok──────────────► member ─┐
//!      │                                   ├─► listen on --my-port
//!      └─fail─► --make-master-on-error ─► master ─┘
//!                      │
//!                      └─unset─► exit
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use muster_common::NodeIdentity;
use muster_common::constants::UNKNOWN_NODE_ID;
use muster_node::cli::Args;
use muster_node::cluster::{FallbackCoordinator, JoinClient};
use muster_node::config::AppConfig;
use muster_node::net;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🚀 Starting Muster node v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;

    // Reject malformed endpoints before dialing anything
    let target = NodeIdentity::from_endpoint(UNKNOWN_NODE_ID, &config.cluster_ip)
        .context("Invalid cluster endpoint")?;

    let address = net::advertised_address(config.my_ip.as_deref(), &target).await;
    let id = config.node_id.unwrap_or_else(NodeIdentity::generate_id);
    let me = NodeIdentity::new(id, address, config.my_port.clone());
    info!("My node info:\n{me}");

    let coordinator = FallbackCoordinator::new(
        JoinClient::new(config.join_config()),
        config.listener_config(),
        config.make_master_on_error,
    );

    tokio::select! {
        result = coordinator.bootstrap(me, target) => result?,
        _ = tokio::signal::ctrl_c() => info!("🛑 Shutdown signal received"),
    }

    info!("👋 Muster node stopped");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
