//! Controller: node registry, partition lookup, failure detection, recovery

pub mod http;
pub mod monitor;
pub mod recovery;
pub mod registry;
pub mod server;

pub use http::{create_router, ControllerState};
pub use monitor::HealthMonitor;
pub use registry::{NodeEntry, NodeRegistry};
pub use server::Controller;
