//! Configuration management for a Muster node.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use muster_common::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CLUSTER_IP, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MY_PORT,
    DEFAULT_REPLY_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

use crate::cli::Args;
use crate::cluster::{JoinConfig, ListenerConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Any cluster node to join through (`address:port`)
    #[serde(default = "default_cluster_ip")]
    pub cluster_ip: String,

    /// Port this node listens on
    #[serde(default = "default_my_port")]
    pub my_port: String,

    /// Advertised address (discovered if not set)
    #[serde(default)]
    pub my_ip: Option<String>,

    /// This node's id (random if not set)
    #[serde(default)]
    pub node_id: Option<i64>,

    /// Become master when the cluster cannot be reached
    #[serde(default)]
    pub make_master_on_error: bool,

    /// Interface the membership listener binds
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Join handshake timeouts
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Membership listener behaviour
    #[serde(default)]
    pub listener: ListenerSettings,
}

/// Client-side handshake configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeConfig {
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Reply timeout in seconds (0 waits forever)
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            reply_timeout_secs: default_reply_timeout(),
        }
    }
}

/// Server-side handshake configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSettings {
    /// Handle joiners on separate tasks
    #[serde(default)]
    pub concurrent: bool,

    /// Request timeout in seconds (0 waits forever)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            concurrent: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// Default value functions
fn default_cluster_ip() -> String { DEFAULT_CLUSTER_IP.to_string() }
fn default_my_port() -> String { DEFAULT_MY_PORT.to_string() }
fn default_bind_host() -> String { DEFAULT_BIND_HOST.to_string() }
fn default_connect_timeout() -> u64 { DEFAULT_CONNECT_TIMEOUT_SECS }
fn default_reply_timeout() -> u64 { DEFAULT_REPLY_TIMEOUT_SECS }
fn default_request_timeout() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }

/// `MUSTER_CLUSTER_IP` for top-level keys, `MUSTER_HANDSHAKE__REPLY_TIMEOUT_SECS` for nested ones
fn environment() -> config::Environment {
    config::Environment::with_prefix("MUSTER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Zero means no limit
fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl AppConfig {
    /// Load configuration from file and `MUSTER_*` env, with CLI overrides
    pub fn load(config_path: &str, args: &Args) -> Result<Self> {
        Self::load_with_env(config_path, args, environment())
    }

    fn load_with_env(config_path: &str, args: &Args, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        let settings = builder
            .add_source(env)
            .build()
            .context("Failed to load config")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        config.apply_overrides(args);
        Ok(config)
    }

    fn apply_overrides(&mut self, args: &Args) {
        if let Some(ref cluster_ip) = args.cluster_ip {
            self.cluster_ip = cluster_ip.clone();
        }
        if let Some(ref my_port) = args.my_port {
            self.my_port = my_port.clone();
        }
        if let Some(ref my_ip) = args.my_ip {
            self.my_ip = Some(my_ip.clone());
        }
        if let Some(node_id) = args.node_id {
            self.node_id = Some(node_id);
        }
        if args.make_master_on_error {
            self.make_master_on_error = true;
        }
    }

    pub fn join_config(&self) -> JoinConfig {
        JoinConfig {
            connect_timeout: Duration::from_secs(self.handshake.connect_timeout_secs),
            reply_timeout: optional_secs(self.handshake.reply_timeout_secs),
        }
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            bind_host: self.bind_host.clone(),
            concurrent: self.listener.concurrent,
            request_timeout: optional_secs(self.listener.request_timeout_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cluster_ip: default_cluster_ip(),
            my_port: default_my_port(),
            my_ip: None,
            node_id: None,
            make_master_on_error: false,
            bind_host: default_bind_host(),
            handshake: HandshakeConfig::default(),
            listener: ListenerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cluster_ip, "127.0.0.1:8001");
        assert_eq!(config.my_port, "8001");
        assert!(!config.make_master_on_error);

        let join = config.join_config();
        assert_eq!(join.connect_timeout, Duration::from_secs(10));
        assert_eq!(join.reply_timeout, Some(Duration::from_secs(10)));
        assert!(!config.listener_config().concurrent);
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let mut config = AppConfig::default();
        config.handshake.reply_timeout_secs = 0;
        config.listener.request_timeout_secs = 0;

        assert_eq!(config.join_config().reply_timeout, None);
        assert_eq!(config.listener_config().request_timeout, None);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "muster",
            "--cluster-ip",
            "10.0.0.5:9000",
            "--my-port",
            "9001",
            "--my-ip",
            "10.0.0.6",
            "--node-id",
            "1234",
            "--make-master-on-error",
        ]);
        let config = AppConfig::load("does/not/exist.toml", &args).unwrap();

        assert_eq!(config.cluster_ip, "10.0.0.5:9000");
        assert_eq!(config.my_port, "9001");
        assert_eq!(config.my_ip.as_deref(), Some("10.0.0.6"));
        assert_eq!(config.node_id, Some(1234));
        assert!(config.make_master_on_error);
    }

    fn env_from(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        environment().source(Some(map))
    }

    #[test]
    fn test_env_overrides_top_level_and_nested_keys() {
        let env = env_from(&[
            ("MUSTER_CLUSTER_IP", "10.9.9.9:7777"),
            ("MUSTER_MY_PORT", "7778"),
            ("MUSTER_MAKE_MASTER_ON_ERROR", "true"),
            ("MUSTER_HANDSHAKE__CONNECT_TIMEOUT_SECS", "3"),
            ("MUSTER_LISTENER__CONCURRENT", "true"),
        ]);
        let args = Args::parse_from(["muster"]);
        let config = AppConfig::load_with_env("does/not/exist.toml", &args, env).unwrap();

        assert_eq!(config.cluster_ip, "10.9.9.9:7777");
        assert_eq!(config.my_port, "7778");
        assert!(config.make_master_on_error);
        assert_eq!(config.join_config().connect_timeout, Duration::from_secs(3));
        assert!(config.listener_config().concurrent);
    }

    #[test]
    fn test_cli_beats_env() {
        let env = env_from(&[("MUSTER_CLUSTER_IP", "10.9.9.9:7777")]);
        let args = Args::parse_from(["muster", "--cluster-ip", "10.0.0.1:8001"]);
        let config = AppConfig::load_with_env("does/not/exist.toml", &args, env).unwrap();

        assert_eq!(config.cluster_ip, "10.0.0.1:8001");
    }

    #[test]
    fn test_original_flag_spellings() {
        let args = Args::parse_from([
            "muster",
            "--clusterip",
            "10.0.0.5:9000",
            "--myport",
            "9001",
            "--makeMasterOnError",
        ]);
        assert_eq!(args.cluster_ip.as_deref(), Some("10.0.0.5:9000"));
        assert_eq!(args.my_port.as_deref(), Some("9001"));
        assert!(args.make_master_on_error);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("muster-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("node.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
cluster_ip = "192.168.0.10:7000"
my_port = "7001"
make_master_on_error = true

[handshake]
reply_timeout_secs = 0

[listener]
concurrent = true
"#
        )
        .unwrap();

        let args = Args::parse_from(["muster"]);
        let config = AppConfig::load(path.to_str().unwrap(), &args).unwrap();

        assert_eq!(config.cluster_ip, "192.168.0.10:7000");
        assert_eq!(config.my_port, "7001");
        assert!(config.make_master_on_error);
        assert_eq!(config.handshake.connect_timeout_secs, 10);
        assert_eq!(config.join_config().reply_timeout, None);
        assert!(config.listener_config().concurrent);

        std::fs::remove_dir_all(&dir).ok();
    }
}
