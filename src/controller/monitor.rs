//! Health monitor: heartbeat-timeout scanning and recovery kicks

use crate::controller::recovery::trigger_recovery;
use crate::controller::registry::NodeRegistry;
use std::sync::Arc;

/// Background loop that scans the registry on a fixed interval and triggers
/// recovery for nodes that stopped heartbeating.
pub struct HealthMonitor {
    registry: Arc<NodeRegistry>,
    http: reqwest::Client,
}

impl HealthMonitor {
    pub fn new(registry: Arc<NodeRegistry>, http: reqwest::Client) -> Self {
        Self { registry, http }
    }

    /// Spawn the perpetual scan loop.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let interval = self.registry.config().monitor_interval();
        let timeout_ms = self.registry.config().heartbeat_timeout_ms;
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a freshly started
        // cluster gets one full interval of heartbeats before being judged.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            // Detection happens under the registry lock; the recovery
            // broadcasts run on their own tasks so a slow broadcast never
            // delays the next scan.
            let newly_dead = self.registry.sweep(timeout_ms);

            for dead_id in newly_dead {
                let registry = self.registry.clone();
                let http = self.http.clone();
                tokio::spawn(async move {
                    trigger_recovery(registry, http, dead_id).await;
                });
            }
        }
    }
}
