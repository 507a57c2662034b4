//! # replikv
//!
//! A minimal replicated key-value store:
//! - A fixed set of storage nodes, keys partitioned with a ring over key hashes
//! - Quorum-checked replicated writes (last-write-wins)
//! - Heartbeat-driven failure detection on a central controller
//! - Data reseeding onto a survivor when a node dies
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            Controller                │
//! │  - node registry (liveness table)    │
//! │  - partition lookup for clients      │
//! │  - health monitor + recovery kicks   │
//! └───────────┬──────────────────────────┘
//!             │ HTTP (register / heartbeat / recover)
//!   ┌─────────┴──────────┬──────────────┐
//!   │                    │              │
//! ┌─▼────────┐    ┌─────▼─────┐   ┌───▼───────┐
//! │ Node 0   │◄──►│ Node 1    │◄─►│ Node 2 …  │
//! │ local map│    │ local map │   │ local map │
//! └──────────┘    └───────────┘   └───────────┘
//!        internal replicate / reseed
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the controller
//! replikv-controller --port 5000
//!
//! # Start storage nodes
//! replikv-node --id 0
//! replikv-node --id 1
//!
//! # Client operations
//! replikv put foo '"bar"'
//! replikv get foo
//! replikv status
//! ```

pub mod common;
pub mod controller;
pub mod node;

// Re-export commonly used types
pub use common::{ClusterConfig, Error, Result};
pub use controller::Controller;
pub use node::NodeServer;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
