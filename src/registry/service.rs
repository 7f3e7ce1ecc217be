use std::sync::Arc;
use sysinfo::System;

use super::types::{now_ms, ShardRecord, HEALTH_OK, SHARD_PREFIX};
use crate::config::{HEARTBEAT_INTERVAL, HEARTBEAT_TTL};
use crate::coordination::client::KvStore;
use crate::error::Result;

/// Read and publish access to shard liveness state.
#[derive(Clone)]
pub struct ShardRegistry {
    kv: Arc<dyn KvStore>,
}

impl ShardRegistry {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Returns the ids of every shard whose heartbeat key currently exists.
    pub async fn list_alive(&self) -> Result<Vec<String>> {
        let prefix = format!("{}/", SHARD_PREFIX);
        let keys = self.kv.prefix_scan(&prefix).await?;

        Ok(keys
            .iter()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .map(|shard_id| shard_id.to_string())
            .collect())
    }

    /// Fetches a single shard's latest heartbeat record.
    ///
    /// Propagates `NotFound` when the shard's lease has expired.
    pub async fn get_metric(&self, shard_id: &str) -> Result<ShardRecord> {
        let value = self.kv.get(&ShardRecord::key(shard_id)).await?;
        let record: ShardRecord = serde_json::from_str(&value)?;
        Ok(record)
    }

    /// Publishes one heartbeat for this shard under the lease TTL.
    pub async fn publish_once(&self, shard_id: &str) -> Result<()> {
        let cpu_utilization = sample_cpu_percent();
        let record = ShardRecord {
            shard_id: shard_id.to_string(),
            cpu_utilization,
            health: HEALTH_OK.to_string(),
            updated_time: now_ms(),
        };

        let value = serde_json::to_string(&record)?;
        self.kv
            .put_with_ttl(&ShardRecord::key(shard_id), value, HEARTBEAT_TTL)
            .await?;

        tracing::info!(
            "Published heartbeat for shard {} (cpu={:.1})",
            shard_id,
            cpu_utilization
        );
        Ok(())
    }

    /// Heartbeat loop for a shard node. Publish failures are logged and
    /// retried on the next tick.
    pub async fn publish_loop(self, shard_id: String) {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            interval.tick().await;
            if let Err(e) = self.publish_once(&shard_id).await {
                tracing::warn!("Heartbeat publish failed for {}: {}", shard_id, e);
            }
        }
    }
}

/// One-shot host-wide CPU utilization in `[0, 100]`.
fn sample_cpu_percent() -> f64 {
    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.global_cpu_info().cpu_usage() as f64
}
