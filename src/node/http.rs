//! HTTP API for a storage node
//!
//! Routes:
//! - `GET  /kv/:key`                 — local read, never consults peers
//! - `PUT  /kv/:key`                 — replicated write with quorum check
//! - `PUT  /internal/replicate/:key` — peer entry point, unconditional overwrite
//! - `POST /internal/recover`        — reseed a dead node's keys to a target
//! - `GET  /debug/dump`              — full local map

use crate::common::{validate_key, ClusterConfig, Result};
use crate::node::replication::{replicate_write, reseed_keys};
use crate::node::store::KvStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct NodeState {
    pub node_id: u32,
    pub store: Arc<Mutex<KvStore>>,
    pub http: reqwest::Client,
    pub config: Arc<ClusterConfig>,
}

pub fn create_router(state: NodeState) -> Router {
    Router::new()
        .route("/kv/:key", get(get_key).put(put_key))
        .route("/internal/replicate/:key", put(internal_replicate))
        .route("/internal/recover", post(internal_recover))
        .route("/debug/dump", get(debug_dump))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PutRequest {
    value: Value,
}

/// Local lookup only. Replica divergence is not reconciled on read.
async fn get_key(
    State(state): State<NodeState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let store = state.store.lock().unwrap();
    match store.get(&key) {
        Some(value) => (
            StatusCode::OK,
            Json(json!({
                "found": true,
                "value": value,
                "node_id": state.node_id,
            })),
        ),
        None => (StatusCode::NOT_FOUND, Json(json!({ "found": false }))),
    }
}

/// Replicated write. The local persist happens first and unconditionally;
/// a missed quorum is reported as a `partial` status, never as a failure of
/// the write that already landed here.
async fn put_key(
    State(state): State<NodeState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<Value>> {
    validate_key(&key)?;

    state.store.lock().unwrap().insert(&key, req.value.clone())?;
    tracing::info!("Stored key='{}' locally on node {}", key, state.node_id);

    let (status, written) = replicate_write(&state, &key, &req.value).await;

    Ok(Json(json!({
        "status": status.as_str(),
        "replicas_written": written,
    })))
}

/// Peer entry point: last-write-wins overwrite, no version comparison.
async fn internal_replicate(
    State(state): State<NodeState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<Value>> {
    validate_key(&key)?;

    state.store.lock().unwrap().insert(&key, req.value)?;
    tracing::debug!("Replicated key='{}' from peer", key);

    Ok(Json(json!({ "status": "ack" })))
}

#[derive(Debug, Deserialize)]
struct RecoverRequest {
    dead_node_id: u32,
    target_node_address: String,
}

async fn internal_recover(
    State(state): State<NodeState>,
    Json(req): Json<RecoverRequest>,
) -> Json<Value> {
    tracing::info!(
        "Recovery: reseeding keys for dead node {}",
        req.dead_node_id
    );

    let reseeded = reseed_keys(&state, req.dead_node_id, &req.target_node_address).await;

    Json(json!({
        "status": "recovery_complete",
        "keys_reseeded": reseeded,
    }))
}

async fn debug_dump(State(state): State<NodeState>) -> Json<Value> {
    let store = state.store.lock().unwrap();
    Json(json!(store.dump()))
}
