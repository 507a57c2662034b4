//! Write replication and recovery reseeding
//!
//! A Put persists locally first, then fans out one replicate RPC per peer in
//! the key's replica set and counts acknowledgments against a fixed quorum
//! threshold. Reseeding is the node-side half of recovery: scan the local
//! store and forward every key the dead node owned to the elected target.

use crate::common::{replica_set, QUORUM_THRESHOLD};
use crate::node::client::replicate_to;
use crate::node::http::NodeState;
use serde_json::Value;
use tokio::task::JoinSet;

/// Outcome of a replicated write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// At least `QUORUM_THRESHOLD` copies were acknowledged
    Success,
    /// The local write landed but the quorum did not
    Partial,
}

impl WriteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStatus::Success => "success",
            WriteStatus::Partial => "partial",
        }
    }
}

/// Fan out a key to every peer in its replica set, in parallel, each call
/// with its own timeout. Failures are logged and simply not counted; nothing
/// is retried within this write. Returns `(status, total copies written)`,
/// where the local write always counts as one.
pub async fn replicate_write(state: &NodeState, key: &str, value: &Value) -> (WriteStatus, usize) {
    let config = &state.config;
    let replicas = replica_set(key, config.node_count, config.replica_count);
    let timeout = config.replicate_timeout();

    let mut tasks = JoinSet::new();
    for peer in replicas.into_iter().filter(|id| *id != state.node_id) {
        let http = state.http.clone();
        let address = config.node_address(peer);
        let key = key.to_string();
        let value = value.clone();

        tasks.spawn(async move {
            let res = replicate_to(&http, &address, &key, &value, timeout).await;
            (peer, res)
        });
    }

    // Bounded join: every call carries its own timeout, so this cannot hang.
    let mut written = 1; // local write
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((peer, Ok(()))) => {
                tracing::debug!("Replicated key='{}' to node {}", key, peer);
                written += 1;
            }
            Ok((peer, Err(e))) => {
                tracing::warn!("Failed to replicate key='{}' to node {}: {}", key, peer, e);
            }
            Err(e) => {
                tracing::warn!("Replication task for key='{}' panicked: {}", key, e);
            }
        }
    }

    let status = if written >= QUORUM_THRESHOLD {
        WriteStatus::Success
    } else {
        WriteStatus::Partial
    };
    (status, written)
}

/// Scan the local store and forward every key whose replica set contains
/// `dead_id` to the reseed target. Several survivors run this concurrently
/// for the same dead node; the redundant forwards are harmless because
/// replicate is an unconditional overwrite. Returns the number of keys
/// forwarded successfully.
pub async fn reseed_keys(state: &NodeState, dead_id: u32, target_address: &str) -> usize {
    let config = &state.config;
    let timeout = config.recover_timeout();

    // Snapshot under the lock, forward without it.
    let entries = state.store.lock().unwrap().entries();

    let mut reseeded = 0;
    for (key, value) in entries {
        let owners = replica_set(&key, config.node_count, config.replica_count);
        if !owners.contains(&dead_id) {
            continue;
        }

        match replicate_to(&state.http, target_address, &key, &value, timeout).await {
            Ok(()) => reseeded += 1,
            Err(e) => tracing::warn!("Failed to reseed key='{}': {}", key, e),
        }
    }

    tracing::info!(
        "Reseeded {} keys for dead node {} to {}",
        reseeded,
        dead_id,
        target_address
    );
    reseeded
}
