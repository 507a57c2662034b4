//! End-to-end cluster tests: real HTTP listeners on loopback, driven with
//! reqwest. Cluster processes are modeled as routers served in-process;
//! heartbeat loops are driven manually so tests control the timing.

use replikv::common::{replica_set, ClusterConfig};
use replikv::controller::{
    create_router as controller_router, ControllerState, HealthMonitor, NodeRegistry,
};
use replikv::node::{create_router as node_router, KvStore, NodeState};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Bind the controller and all node listeners on a contiguous port range.
/// The listeners are kept bound, so there is no reuse race: the config's
/// derived addresses are exactly the sockets the servers will serve on.
async fn bind_cluster(node_count: u32) -> (TcpListener, Vec<TcpListener>, ClusterConfig) {
    loop {
        let controller = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let controller_port = controller.local_addr().unwrap().port();

        if controller_port.checked_add(node_count as u16 + 1).is_none() {
            continue;
        }

        let mut nodes = Vec::new();
        for i in 0..node_count as u16 {
            match TcpListener::bind(("127.0.0.1", controller_port + 1 + i)).await {
                Ok(l) => nodes.push(l),
                Err(_) => break,
            }
        }
        if nodes.len() != node_count as usize {
            continue;
        }

        let config = ClusterConfig {
            node_count,
            replica_count: 4,
            heartbeat_interval_ms: 100,
            heartbeat_timeout_ms: 400,
            monitor_interval_ms: 100,
            host: "127.0.0.1".to_string(),
            controller_port,
            node_base_port: controller_port + 1,
            replicate_timeout_ms: 1000,
            recover_timeout_ms: 2000,
            register_timeout_ms: 1000,
        };
        return (controller, nodes, config);
    }
}

fn start_controller(listener: TcpListener, config: &ClusterConfig) -> Arc<NodeRegistry> {
    let registry = Arc::new(NodeRegistry::new(config.clone()));
    let _monitor = HealthMonitor::new(registry.clone(), reqwest::Client::new()).spawn();

    let router = controller_router(ControllerState {
        registry: registry.clone(),
    });
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    registry
}

fn start_node(listener: TcpListener, node_id: u32, config: &ClusterConfig, dir: &TempDir) {
    let store_path = dir.path().join(format!("storage_node_{}.json", node_id));
    let state = NodeState {
        node_id,
        store: Arc::new(Mutex::new(KvStore::open(store_path).unwrap())),
        http: reqwest::Client::new(),
        config: Arc::new(config.clone()),
    };

    let router = node_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

async fn register(http: &reqwest::Client, config: &ClusterConfig, node_id: u32) {
    let resp = http
        .post(format!("{}/register", config.controller_url()))
        .json(&json!({ "node_id": node_id, "address": config.node_address(node_id) }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
}

/// Keep a node's heartbeat alive on the test's schedule.
fn spawn_heartbeats(config: &ClusterConfig, node_id: u32) -> tokio::task::JoinHandle<()> {
    let url = format!("{}/heartbeat", config.controller_url());
    let interval = config.heartbeat_interval();
    tokio::spawn(async move {
        let http = reqwest::Client::new();
        loop {
            let _ = http.post(&url).json(&json!({ "node_id": node_id })).send().await;
            tokio::time::sleep(interval).await;
        }
    })
}

#[tokio::test]
async fn test_register_partition_status() {
    let (ctrl_listener, _node_listeners, mut config) = bind_cluster(4).await;
    // Death detection is not under test here
    config.heartbeat_timeout_ms = 60_000;
    start_controller(ctrl_listener, &config);
    let http = reqwest::Client::new();

    // No nodes registered yet: lookup is a 503
    let resp = http
        .get(format!("{}/partition/foo", config.controller_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    for id in 0..4 {
        register(&http, &config, id).await;
    }

    let status: Value = http
        .get(format!("{}/status", config.controller_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["config"]["total_nodes"], 4);
    assert_eq!(status["config"]["replica_count"], 4);
    assert_eq!(status["nodes"].as_object().unwrap().len(), 4);
    assert_eq!(status["nodes"]["2"]["alive"], true);

    let info: Value = http
        .get(format!("{}/partition/foo", config.controller_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let replicas: Vec<u32> = info["replica_node_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap() as u32)
        .collect();
    assert_eq!(replicas, replica_set("foo", 4, 4));
    assert_eq!(
        info["primary_address"].as_str().unwrap(),
        config.node_address(replicas[0])
    );

    // Malformed registration: no side effects
    let resp = http
        .post(format!("{}/register", config.controller_url()))
        .json(&json!({ "node_id": 9 }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    let status: Value = http
        .get(format!("{}/status", config.controller_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["nodes"].as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn test_put_reaches_quorum_on_full_cluster() {
    let (ctrl_listener, node_listeners, mut config) = bind_cluster(4).await;
    config.heartbeat_timeout_ms = 60_000;
    start_controller(ctrl_listener, &config);

    let dir = TempDir::new().unwrap();
    for (id, listener) in node_listeners.into_iter().enumerate() {
        start_node(listener, id as u32, &config, &dir);
    }

    let http = reqwest::Client::new();
    let primary = replica_set("foo", 4, 4)[0];

    let resp: Value = http
        .put(format!("{}/kv/foo", config.node_address(primary)))
        .json(&json!({ "value": "bar" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "success");
    // N=4, R=4: 3 peer replications plus the local write
    assert_eq!(resp["replicas_written"], 4);

    // Full replication: every node serves the key locally
    for id in 0..4u32 {
        let got: Value = http
            .get(format!("{}/kv/foo", config.node_address(id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(got["found"], true);
        assert_eq!(got["value"], "bar");
        assert_eq!(got["node_id"], id);
    }
}

#[tokio::test]
async fn test_put_is_partial_when_all_peers_are_down() {
    let (ctrl_listener, node_listeners, mut config) = bind_cluster(4).await;
    config.heartbeat_timeout_ms = 60_000;
    start_controller(ctrl_listener, &config);

    let dir = TempDir::new().unwrap();
    let mut listeners = node_listeners.into_iter();
    let first = listeners.next().unwrap();
    start_node(first, 0, &config, &dir);
    // Nodes 1..3 are never started; their ports refuse connections.
    drop(listeners);

    let http = reqwest::Client::new();
    let resp = http
        .put(format!("{}/kv/foo", config.node_address(0)))
        .json(&json!({ "value": "bar" }))
        .send()
        .await
        .unwrap();

    // The quorum miss is signaled in the body, not as a hard failure: the
    // local write already landed.
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "partial");
    assert_eq!(body["replicas_written"], 1);

    let got: Value = http
        .get(format!("{}/kv/foo", config.node_address(0)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["found"], true);
}

#[tokio::test]
async fn test_internal_replicate_is_idempotent_and_rejects_malformed() {
    let (ctrl_listener, node_listeners, mut config) = bind_cluster(1).await;
    config.heartbeat_timeout_ms = 60_000;
    start_controller(ctrl_listener, &config);

    let dir = TempDir::new().unwrap();
    start_node(node_listeners.into_iter().next().unwrap(), 0, &config, &dir);

    let http = reqwest::Client::new();
    let url = format!("{}/internal/replicate/foo", config.node_address(0));

    for _ in 0..2 {
        let resp = http
            .put(&url)
            .json(&json!({ "value": {"a": 1} }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let dump: Value = http
        .get(format!("{}/debug/dump", config.node_address(0)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dump.as_object().unwrap().len(), 1);
    assert_eq!(dump["foo"], json!({"a": 1}));

    // Missing value field: client error, no side effects
    let resp = http
        .put(format!("{}/internal/replicate/bar", config.node_address(0)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());

    let resp = http
        .get(format!("{}/kv/bar", config.node_address(0)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dead_node_detection_and_reseed() {
    let (ctrl_listener, node_listeners, mut config) = bind_cluster(3).await;
    config.replica_count = 2;

    start_controller(ctrl_listener, &config);

    let dir = TempDir::new().unwrap();
    for (id, listener) in node_listeners.into_iter().enumerate() {
        start_node(listener, id as u32, &config, &dir);
    }

    let http = reqwest::Client::new();
    for id in 0..3 {
        register(&http, &config, id).await;
    }

    // Nodes 0 and 1 keep heartbeating; node 2 goes silent after registering.
    let _hb0 = spawn_heartbeats(&config, 0);
    let _hb1 = spawn_heartbeats(&config, 1);

    // Pick one key owned by node 2 and one that is not.
    let owned = (0..100)
        .map(|i| format!("key-{}", i))
        .find(|k| replica_set(k, 3, 2).contains(&2))
        .unwrap();
    let unowned = (0..100)
        .map(|i| format!("key-{}", i))
        .find(|k| !replica_set(k, 3, 2).contains(&2))
        .unwrap();

    // Seed both onto node 1 only. Node 0 (the first enumerated survivor)
    // will be elected as the reseed target.
    for key in [&owned, &unowned] {
        let resp = http
            .put(format!("{}/internal/replicate/{}", config.node_address(1), key))
            .json(&json!({ "value": format!("value-of-{}", key) }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    // Wait past the heartbeat timeout plus a few monitor ticks.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let status: Value = http
        .get(format!("{}/status", config.controller_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["nodes"]["2"]["alive"], false);
    assert_eq!(status["nodes"]["0"]["alive"], true);
    assert_eq!(status["nodes"]["1"]["alive"], true);

    // The dead node's key landed on the target with the right value; the
    // unrelated key did not travel.
    let dump: Value = http
        .get(format!("{}/debug/dump", config.node_address(0)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dump[&owned], format!("value-of-{}", owned));
    assert!(dump.get(&unowned).is_none());

    // A heartbeat from the silent node flips it back to alive.
    http.post(format!("{}/heartbeat", config.controller_url()))
        .json(&json!({ "node_id": 2 }))
        .send()
        .await
        .unwrap();

    let status: Value = http
        .get(format!("{}/status", config.controller_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["nodes"]["2"]["alive"], true);
}
