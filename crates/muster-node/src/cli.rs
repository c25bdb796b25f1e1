//! Command-line arguments.

use clap::Parser;

/// Muster - cluster join handshake node
#[derive(Parser, Debug)]
#[command(name = "muster")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/muster.toml")]
    pub config: String,

    /// Address of any cluster node to join through, as address:port
    #[arg(long, alias = "clusterip")]
    pub cluster_ip: Option<String>,

    /// Port this node listens on
    #[arg(long, alias = "myport")]
    pub my_port: Option<String>,

    /// Address to advertise instead of the discovered one
    #[arg(long)]
    pub my_ip: Option<String>,

    /// Fixed node id instead of a random one
    #[arg(long)]
    pub node_id: Option<i64>,

    /// Become master if the cluster node cannot be reached
    #[arg(long, alias = "makeMasterOnError")]
    pub make_master_on_error: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    pub json_logs: bool,
}
