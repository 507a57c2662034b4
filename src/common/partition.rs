//! Key partitioning over a fixed-size node ring
//!
//! Keys hash onto a ring of `node_count` slots. The replica set for a key is
//! the primary slot followed by its clockwise successors. The placement is a
//! pure function of `(key, node_count)`: no rebalancing happens on membership
//! changes, which is fine here because the cluster size is fixed.

/// 32-bit string hash: `h = h * 31 + char`, with wrapping arithmetic.
///
/// Unsigned, so the result is never negative and always below 2^32.
pub fn string_hash(key: &str) -> u32 {
    let mut hash: u32 = 0;
    for ch in key.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as u32);
    }
    hash
}

/// Ordered replica set for a key: the primary node id first, then its ring
/// successors, `min(replica_count, node_count)` entries in total.
///
/// Capping at `node_count` keeps the entries pairwise distinct when the
/// configured replica factor exceeds the cluster size; in that degenerate
/// configuration every node holds every key.
pub fn replica_set(key: &str, node_count: u32, replica_count: usize) -> Vec<u32> {
    if node_count == 0 {
        return Vec::new();
    }

    let primary = string_hash(key) % node_count;
    let len = replica_count.min(node_count as usize);

    (0..len as u32).map(|i| (primary + i) % node_count).collect()
}
