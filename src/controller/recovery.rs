//! Controller-side recovery: broadcast a reseed request for a dead node
//!
//! The controller does not move data itself. It elects a single reseed
//! target (the first enumerated alive node) and asks every alive node to
//! scan its own store and forward the dead node's keys to that target.
//! Recovery moves data only; it never restarts the dead process.

use crate::controller::registry::NodeRegistry;
use serde_json::json;
use std::sync::Arc;

/// Broadcast a recovery request for `dead_id` to every alive node.
///
/// Per-node delivery failures are logged and do not abort the broadcast.
/// With no alive nodes at all there is nothing to do; the cluster state is
/// unrecoverable and only an error is logged.
pub async fn trigger_recovery(registry: Arc<NodeRegistry>, http: reqwest::Client, dead_id: u32) {
    tracing::info!("Initiating recovery for dead node {}", dead_id);

    let alive = registry.alive_nodes();

    let Some((target_id, target_address)) = alive.first().cloned() else {
        tracing::error!("No alive nodes to reseed data for node {}", dead_id);
        return;
    };

    tracing::info!(
        "Reseed target for node {}: node {} at {}",
        dead_id,
        target_id,
        target_address
    );

    let timeout = registry.config().recover_timeout();

    for (id, address) in &alive {
        let res = http
            .post(format!("{}/internal/recover", address))
            .timeout(timeout)
            .json(&json!({
                "dead_node_id": dead_id,
                "target_node_address": target_address,
            }))
            .send()
            .await;

        match res {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Recovery request accepted by node {}", id);
            }
            Ok(resp) => {
                tracing::warn!(
                    "Recovery request to node {} rejected: {}",
                    id,
                    resp.status()
                );
            }
            Err(e) => {
                tracing::warn!("Recovery request to node {} failed: {}", id, e);
            }
        }
    }

    tracing::info!("Recovery broadcast for node {} complete", dead_id);
}
