//! Configuration for replikv components
//!
//! The cluster shape is fixed at process start: a known node count, a fixed
//! replica factor, and a contiguous port range (node `i` listens on
//! `node_base_port + i`). Nothing here is hot-reloadable.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cluster-wide configuration shared by the controller, nodes, and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Total number of storage nodes in the cluster
    #[serde(default = "default_node_count")]
    pub node_count: u32,

    /// Number of copies per key (primary included)
    #[serde(default = "default_replica_count")]
    pub replica_count: usize,

    /// How often nodes send heartbeats
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,

    /// Heartbeat age after which a node is marked dead
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_ms: u64,

    /// Health monitor scan interval
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_ms: u64,

    /// Host all processes bind on / dial
    #[serde(default = "default_host")]
    pub host: String,

    /// Controller HTTP port
    #[serde(default = "default_controller_port")]
    pub controller_port: u16,

    /// Node `i` listens on `node_base_port + i`
    #[serde(default = "default_node_base_port")]
    pub node_base_port: u16,

    /// Per-peer timeout for replicate RPCs during a Put fan-out
    #[serde(default = "default_replicate_timeout")]
    pub replicate_timeout_ms: u64,

    /// Timeout for recovery broadcast and reseed-forward RPCs
    #[serde(default = "default_recover_timeout")]
    pub recover_timeout_ms: u64,

    /// Timeout for the one-shot registration call at node startup
    #[serde(default = "default_register_timeout")]
    pub register_timeout_ms: u64,
}

fn default_node_count() -> u32 {
    4
}
fn default_replica_count() -> usize {
    4
}
fn default_heartbeat_interval() -> u64 {
    3000
}
fn default_heartbeat_timeout() -> u64 {
    8000
}
fn default_monitor_interval() -> u64 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_controller_port() -> u16 {
    5000
}
fn default_node_base_port() -> u16 {
    5001
}
fn default_replicate_timeout() -> u64 {
    3000
}
fn default_recover_timeout() -> u64 {
    5000
}
fn default_register_timeout() -> u64 {
    3000
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            replica_count: default_replica_count(),
            heartbeat_interval_ms: default_heartbeat_interval(),
            heartbeat_timeout_ms: default_heartbeat_timeout(),
            monitor_interval_ms: default_monitor_interval(),
            host: default_host(),
            controller_port: default_controller_port(),
            node_base_port: default_node_base_port(),
            replicate_timeout_ms: default_replicate_timeout(),
            recover_timeout_ms: default_recover_timeout(),
            register_timeout_ms: default_register_timeout(),
        }
    }
}

impl ClusterConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file does not set.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(Error::InvalidConfig("node_count must be > 0".into()));
        }
        if self.replica_count == 0 {
            return Err(Error::InvalidConfig("replica_count must be > 0".into()));
        }
        Ok(())
    }

    /// Base URL of the controller
    pub fn controller_url(&self) -> String {
        format!("http://{}:{}", self.host, self.controller_port)
    }

    /// Base URL of node `id`
    pub fn node_address(&self, id: u32) -> String {
        format!("http://{}:{}", self.host, self.node_base_port + id as u16)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn replicate_timeout(&self) -> Duration {
        Duration::from_millis(self.replicate_timeout_ms)
    }

    pub fn recover_timeout(&self) -> Duration {
        Duration::from_millis(self.recover_timeout_ms)
    }

    pub fn register_timeout(&self) -> Duration {
        Duration::from_millis(self.register_timeout_ms)
    }
}
