//! HTTP API for the controller
//!
//! Routes:
//! - `POST /register`       — node registration (idempotent upsert)
//! - `POST /heartbeat`      — liveness signal, never fails
//! - `GET  /partition/:key` — resolve a key's primary + replica set
//! - `GET  /status`         — full registry snapshot + cluster config

use crate::common::Result;
use crate::controller::registry::NodeRegistry;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct ControllerState {
    pub registry: Arc<NodeRegistry>,
}

pub fn create_router(state: ControllerState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/heartbeat", post(heartbeat))
        .route("/partition/:key", get(partition))
        .route("/status", get(status))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    node_id: u32,
    address: String,
}

/// Register a node. Serde rejects bodies missing `node_id` or `address`
/// before the handler runs, so a malformed request has no side effects.
async fn register(
    State(state): State<ControllerState>,
    Json(req): Json<RegisterRequest>,
) -> Json<Value> {
    state.registry.register(req.node_id, req.address);
    Json(json!({ "status": "registered" }))
}

#[derive(Debug, Deserialize)]
struct HeartbeatRequest {
    node_id: u32,
}

/// Heartbeats never fail: unknown ids are accepted and ignored.
async fn heartbeat(
    State(state): State<ControllerState>,
    Json(req): Json<HeartbeatRequest>,
) -> Json<Value> {
    state.registry.heartbeat(req.node_id);
    Json(json!({ "status": "ack" }))
}

async fn partition(
    State(state): State<ControllerState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    let info = state.registry.lookup(&key)?;
    Ok(Json(json!({
        "primary_address": info.primary_address,
        "replica_node_ids": info.replica_node_ids,
    })))
}

async fn status(State(state): State<ControllerState>) -> Json<Value> {
    let config = state.registry.config();
    Json(json!({
        "config": {
            "total_nodes": config.node_count,
            "replica_count": config.replica_count,
            "heartbeat_timeout_ms": config.heartbeat_timeout_ms,
        },
        "nodes": state.registry.snapshot(),
    }))
}
