//! Controller server

use crate::common::{ClusterConfig, Result};
use crate::controller::http::{create_router, ControllerState};
use crate::controller::monitor::HealthMonitor;
use crate::controller::registry::NodeRegistry;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Controller {
    config: ClusterConfig,
}

impl Controller {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        self.config.validate()?;

        tracing::info!("Starting controller");
        tracing::info!("  HTTP API: {}", self.config.controller_url());
        tracing::info!("  Cluster size: {}", self.config.node_count);
        tracing::info!("  Replica factor: {}", self.config.replica_count);
        tracing::info!("  Heartbeat timeout: {}ms", self.config.heartbeat_timeout_ms);

        let registry = Arc::new(NodeRegistry::new(self.config.clone()));
        let http = reqwest::Client::new();

        let _monitor_handle = HealthMonitor::new(registry.clone(), http).spawn();

        let router = create_router(ControllerState { registry });

        let bind_addr: SocketAddr = format!("{}:{}", self.config.host, self.config.controller_port)
            .parse()
            .map_err(|e| crate::Error::Internal(format!("invalid bind address: {}", e)))?;
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        tracing::info!("✓ Controller ready");
        axum::serve(listener, router).await?;

        Ok(())
    }
}
