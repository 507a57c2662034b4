//! Utility functions for replikv

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp (milliseconds)
pub fn timestamp_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Validate key (must be non-empty, reasonable length, no control chars)
pub fn validate_key(key: &str) -> crate::Result<()> {
    if key.is_empty() {
        return Err(crate::Error::InvalidRequest("key cannot be empty".into()));
    }

    if key.len() > 1024 {
        return Err(crate::Error::InvalidRequest(
            "key too long (max 1024 bytes)".into(),
        ));
    }

    if key.chars().any(|c| c.is_control()) {
        return Err(crate::Error::InvalidRequest(
            "key contains invalid characters".into(),
        ));
    }

    Ok(())
}
