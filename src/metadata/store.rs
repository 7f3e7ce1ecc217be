use std::sync::Arc;

use crate::coordination::client::KvStore;
use crate::error::{Error, Result};
use crate::registry::service::ShardRegistry;

/// Prefix under which counter bindings live in the coordination store.
pub const COUNTER_PREFIX: &str = "counters";

/// Access to counter → shard-set bindings.
#[derive(Clone)]
pub struct CounterBindings {
    kv: Arc<dyn KvStore>,
    registry: ShardRegistry,
}

impl CounterBindings {
    pub fn new(kv: Arc<dyn KvStore>, registry: ShardRegistry) -> Self {
        Self { kv, registry }
    }

    fn key(counter_id: &str) -> String {
        format!("{}/{}", COUNTER_PREFIX, counter_id)
    }

    /// Persists a binding as a canonical ordered JSON array of shard ids.
    pub async fn save(&self, counter_id: &str, shard_ids: &[String]) -> Result<()> {
        let data = serde_json::to_string(shard_ids)?;
        self.kv.put(&Self::key(counter_id), data).await?;
        Ok(())
    }

    /// Loads a binding. Propagates `NotFound` for unknown counter ids.
    pub async fn load(&self, counter_id: &str) -> Result<Vec<String>> {
        let data = self.kv.get(&Self::key(counter_id)).await?;
        let shard_ids: Vec<String> = serde_json::from_str(&data)?;
        Ok(shard_ids)
    }

    /// Loads a binding, assigning one from the currently live shard set if
    /// the counter id has never been seen.
    ///
    /// The first write is made authoritative with a compare-and-swap put:
    /// concurrent callers racing on a fresh id all converge on whichever
    /// assignment won.
    pub async fn load_or_assign(&self, counter_id: &str) -> Result<Vec<String>> {
        match self.load(counter_id).await {
            Ok(shard_ids) => Ok(shard_ids),
            Err(e) if e.is_not_found() => {
                let alive = self.registry.list_alive().await?;
                let assigned = assign_shards(alive);
                if assigned.is_empty() {
                    // Persisting an empty binding would brick the id forever.
                    return Err(Error::Selection(
                        "no live shards available for assignment".to_string(),
                    ));
                }

                let data = serde_json::to_string(&assigned)?;
                if self.kv.put_if_absent(&Self::key(counter_id), data).await? {
                    tracing::info!(
                        "Assigned {} shard(s) to counter {}: {:?}",
                        assigned.len(),
                        counter_id,
                        assigned
                    );
                    Ok(assigned)
                } else {
                    // Lost the creation race; the stored binding wins.
                    self.load(counter_id).await
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// Reference assignment policy: bind every currently live shard, in
/// canonical order. A pure function of the live set.
fn assign_shards(alive: Vec<String>) -> Vec<String> {
    let mut shard_ids = alive;
    shard_ids.sort();
    shard_ids
}
