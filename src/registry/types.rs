use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix under which shard heartbeat records live in the coordination store.
pub const SHARD_PREFIX: &str = "shards";

/// Health value a functioning shard advertises.
pub const HEALTH_OK: &str = "ok";

/// A shard's heartbeat record.
///
/// Written only by the shard that owns the key, so there are never concurrent
/// writers per key. `cpu_utilization` is a host-wide percentage in `[0, 100]`;
/// 100 doubles as the "no usable metric" sentinel for selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardRecord {
    pub shard_id: String,
    pub cpu_utilization: f64,
    pub health: String,
    pub updated_time: u64,
}

impl ShardRecord {
    /// Coordination-store key for a shard's heartbeat.
    pub fn key(shard_id: &str) -> String {
        format!("{}/{}", SHARD_PREFIX, shard_id)
    }

    pub fn is_healthy(&self) -> bool {
        self.health == HEALTH_OK
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
