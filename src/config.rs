//! Environment-driven configuration.
//!
//! All settings are read once at startup. Periodic-job timings are fixed
//! constants: the heartbeat lease TTL must stay strictly greater than the
//! publish interval so a silent shard disappears within one TTL.

use std::time::Duration;

/// Shard heartbeat publish interval.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// Heartbeat lease TTL. Must exceed `HEARTBEAT_INTERVAL`.
pub const HEARTBEAT_TTL: Duration = Duration::from_secs(6);
/// Deadline applied to every coordination-store call.
pub const COORDINATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Total timeout for an outbound request to a shard.
pub const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);
/// Port shards listen on; the coordinator dials `http://<shard_id>:<SHARD_PORT>`.
pub const SHARD_PORT: u16 = 8080;

/// Which role this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Coordinator: stateless front door for the client API.
    App,
    /// Shard: holds partial counters and advertises liveness.
    Shard,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Coordination store endpoints (`ETCD_ENDPOINTS`, comma-separated).
    pub etcd_endpoints: Vec<String>,
    /// This node's shard id (`POD_IP`); used as its heartbeat key and address.
    pub shard_id: String,
    /// Node role (`SERVICE_TYPE`).
    pub role: Role,
    /// HTTP listen port (`PORT`).
    pub port: u16,
    /// Lenient read fan-out (`READ_MODE=lenient`): dead bound shards
    /// contribute zero instead of failing the whole read.
    pub lenient_reads: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let etcd_endpoints = std::env::var("ETCD_ENDPOINTS")
            .unwrap_or_else(|_| "localhost:2379".to_string())
            .split(',')
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty())
            .collect();

        let shard_id = std::env::var("POD_IP").unwrap_or_else(|_| "unknown".to_string());

        let role = match std::env::var("SERVICE_TYPE").as_deref() {
            Ok("shard") => Role::Shard,
            _ => Role::App,
        };

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let lenient_reads = matches!(std::env::var("READ_MODE").as_deref(), Ok("lenient"));

        Self {
            etcd_endpoints,
            shard_id,
            role,
            port,
            lenient_reads,
        }
    }
}
