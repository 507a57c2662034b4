//! Outbound HTTP calls made by a node: controller registration, heartbeats,
//! and peer replication. Every call carries its own timeout; an expired call
//! is treated as failed and abandoned.

use crate::common::{ClusterConfig, Error, Result};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControllerClient {
    pub fn new(http: reqwest::Client, config: &ClusterConfig) -> Self {
        Self {
            http,
            base_url: config.controller_url(),
        }
    }

    /// One-shot registration at startup. The caller logs a failure and moves
    /// on; the periodic heartbeat is the only implicit retry.
    pub async fn register(&self, node_id: u32, address: &str, timeout: Duration) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/register", self.base_url))
            .timeout(timeout)
            .json(&json!({ "node_id": node_id, "address": address }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Internal(format!(
                "registration rejected: {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Fire-and-forget heartbeat. Errors are surfaced so the loop can log
    /// them at debug level, but nothing is retried before the next interval.
    pub async fn heartbeat(&self, node_id: u32, timeout: Duration) -> Result<()> {
        self.http
            .post(format!("{}/heartbeat", self.base_url))
            .timeout(timeout)
            .json(&json!({ "node_id": node_id }))
            .send()
            .await?;
        Ok(())
    }
}

/// Replicate one key to a peer (or to the reseed target during recovery).
/// An unconditional overwrite on the remote side, so repeats are harmless.
pub async fn replicate_to(
    http: &reqwest::Client,
    address: &str,
    key: &str,
    value: &Value,
    timeout: Duration,
) -> Result<()> {
    let resp = http
        .put(format!("{}/internal/replicate/{}", address, key))
        .timeout(timeout)
        .json(&json!({ "value": value }))
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(Error::Internal(format!(
            "replicate rejected by {}: {}",
            address,
            resp.status()
        )));
    }
    Ok(())
}
