//! Storage node: local durable map, replicated writes, reseed protocol

pub mod client;
pub mod http;
pub mod replication;
pub mod server;
pub mod store;

pub use http::{create_router, NodeState};
pub use server::NodeServer;
pub use store::KvStore;
