//! Storage node server

use crate::common::{ClusterConfig, Error, Result};
use crate::node::client::ControllerClient;
use crate::node::http::{create_router, NodeState};
use crate::node::store::KvStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub struct NodeServer {
    config: ClusterConfig,
    node_id: u32,
    data_dir: PathBuf,
}

impl NodeServer {
    pub fn new(config: ClusterConfig, node_id: u32, data_dir: PathBuf) -> Self {
        Self {
            config,
            node_id,
            data_dir,
        }
    }

    pub async fn serve(self) -> Result<()> {
        self.config.validate()?;
        if self.node_id >= self.config.node_count {
            return Err(Error::InvalidConfig(format!(
                "node id {} outside cluster of {} nodes",
                self.node_id, self.config.node_count
            )));
        }

        let address = self.config.node_address(self.node_id);
        let store_path = self
            .data_dir
            .join(format!("storage_node_{}.json", self.node_id));

        tracing::info!("Starting node {}", self.node_id);
        tracing::info!("  HTTP API: {}", address);
        tracing::info!("  Store file: {}", store_path.display());
        tracing::info!("  Controller: {}", self.config.controller_url());

        let store = Arc::new(Mutex::new(KvStore::open(&store_path)?));
        let http = reqwest::Client::new();
        let controller = ControllerClient::new(http.clone(), &self.config);
        let config = Arc::new(self.config);

        // Register once at startup. A failure is logged, not retried: the
        // heartbeat loop is the only implicit retry and does not re-register.
        match controller
            .register(self.node_id, &address, config.register_timeout())
            .await
        {
            Ok(()) => tracing::info!("Registered with controller as node {}", self.node_id),
            Err(e) => tracing::error!("Could not register with controller: {}", e),
        }

        let _heartbeat_handle = spawn_heartbeat_loop(controller, self.node_id, config.clone());

        let state = NodeState {
            node_id: self.node_id,
            store,
            http,
            config: config.clone(),
        };
        let router = create_router(state);

        let bind_addr: SocketAddr = format!(
            "{}:{}",
            config.host,
            config.node_base_port + self.node_id as u16
        )
        .parse()
        .map_err(|e| Error::Internal(format!("invalid bind address: {}", e)))?;
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        tracing::info!("✓ Node {} ready", self.node_id);
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// Fire-and-forget heartbeat loop: one POST per interval, failures swallowed
/// until the next tick.
fn spawn_heartbeat_loop(
    controller: ControllerClient,
    node_id: u32,
    config: Arc<ClusterConfig>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.heartbeat_interval());
        let timeout = config.register_timeout();

        loop {
            ticker.tick().await;
            if let Err(e) = controller.heartbeat(node_id, timeout).await {
                tracing::debug!("Heartbeat failed: {}", e);
            }
        }
    })
}
