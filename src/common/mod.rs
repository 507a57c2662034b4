//! Common utilities and types shared across replikv

pub mod config;
pub mod error;
pub mod partition;
pub mod utils;

pub use config::ClusterConfig;
pub use error::{Error, Result};
pub use partition::{replica_set, string_hash};
pub use utils::{timestamp_now_millis, validate_key};

/// Minimum number of acknowledged copies (including the local write) for a
/// Put to report `success`. A fixed constant, deliberately not derived from
/// the configured replica factor.
pub const QUORUM_THRESHOLD: usize = 2;
