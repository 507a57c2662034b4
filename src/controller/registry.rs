//! Node registry: the controller-side liveness table
//!
//! One entry per node id. Entries are created on registration and never
//! removed; a node id is a permanent slot that a recovered process can
//! re-register under. All reads and mutations go through a single mutex,
//! held only for the duration of an in-memory map operation, never across
//! network I/O.

use crate::common::{replica_set, timestamp_now_millis, ClusterConfig, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Registry entry for one storage node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub address: String,
    /// Unix millis of the last heartbeat (or registration)
    pub last_heartbeat: u64,
    pub alive: bool,
}

/// Result of a partition lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub primary_address: String,
    pub replica_node_ids: Vec<u32>,
}

pub struct NodeRegistry {
    // BTreeMap keeps enumeration order deterministic; recovery elects the
    // first enumerated alive node as the reseed target.
    nodes: Mutex<BTreeMap<u32, NodeEntry>>,
    config: ClusterConfig,
}

impl NodeRegistry {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Register or re-register a node. Idempotent upsert: a duplicate
    /// registration of the same id simply overwrites the address.
    pub fn register(&self, node_id: u32, address: String) {
        let mut nodes = self.nodes.lock().unwrap();
        nodes.insert(
            node_id,
            NodeEntry {
                address: address.clone(),
                last_heartbeat: timestamp_now_millis(),
                alive: true,
            },
        );
        tracing::info!("Registered node {} at {}", node_id, address);
    }

    /// Record a heartbeat. Unknown ids are silently accepted; a heartbeat
    /// from a node marked dead flips it back to alive.
    pub fn heartbeat(&self, node_id: u32) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(entry) = nodes.get_mut(&node_id) {
            entry.last_heartbeat = timestamp_now_millis();
            if !entry.alive {
                entry.alive = true;
                tracing::info!("Node {} is back online", node_id);
            }
        }
    }

    /// Resolve the primary for a key: the first alive node in the key's
    /// replica set. The returned replica id list is the full, unfiltered set.
    pub fn lookup(&self, key: &str) -> Result<PartitionInfo> {
        let replicas = replica_set(key, self.config.node_count, self.config.replica_count);

        let nodes = self.nodes.lock().unwrap();
        for id in &replicas {
            if let Some(entry) = nodes.get(id) {
                if entry.alive {
                    return Ok(PartitionInfo {
                        primary_address: entry.address.clone(),
                        replica_node_ids: replicas.clone(),
                    });
                }
            }
        }

        Err(Error::NoAvailableNode)
    }

    /// Mark alive nodes whose heartbeat age exceeds `timeout_ms` as dead and
    /// return their ids. Edge-triggered: a node already dead is not
    /// re-reported until a heartbeat revives it.
    pub fn sweep(&self, timeout_ms: u64) -> Vec<u32> {
        let now = timestamp_now_millis();
        let mut newly_dead = Vec::new();

        let mut nodes = self.nodes.lock().unwrap();
        for (id, entry) in nodes.iter_mut() {
            if entry.alive && now.saturating_sub(entry.last_heartbeat) > timeout_ms {
                tracing::warn!("Node {} missed heartbeats, marking dead", id);
                entry.alive = false;
                newly_dead.push(*id);
            }
        }

        newly_dead
    }

    /// Alive nodes in id order, as `(id, address)` pairs
    pub fn alive_nodes(&self) -> Vec<(u32, String)> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, entry)| entry.alive)
            .map(|(id, entry)| (*id, entry.address.clone()))
            .collect()
    }

    /// Full registry snapshot for status queries
    pub fn snapshot(&self) -> BTreeMap<u32, NodeEntry> {
        self.nodes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().unwrap().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn set_last_heartbeat(&self, node_id: u32, at: u64) {
        if let Some(entry) = self.nodes.lock().unwrap().get_mut(&node_id) {
            entry.last_heartbeat = at;
        }
    }
}
