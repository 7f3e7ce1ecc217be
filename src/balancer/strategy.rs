use crate::error::{Error, Result};
use crate::registry::types::ShardRecord;

/// CPU value at or above which a shard's metric is considered unusable.
pub const CPU_SATURATED: f64 = 100.0;

/// Picks one shard from a filtered candidate list.
///
/// Implementations must be stateless and side-effect free so a test can
/// substitute a deterministic strategy.
pub trait SelectionStrategy: Send + Sync {
    fn select<'a>(&self, candidates: &'a [ShardRecord]) -> Result<&'a ShardRecord>;
}

/// Greedy least-CPU selection: the candidate with the smallest reported CPU
/// utilization wins, earlier candidates winning ties. An empty list, or a
/// list where every candidate sits at the saturation sentinel, yields a
/// selection error.
pub struct LeastCpuStrategy;

impl SelectionStrategy for LeastCpuStrategy {
    fn select<'a>(&self, candidates: &'a [ShardRecord]) -> Result<&'a ShardRecord> {
        let mut selected: Option<&ShardRecord> = None;
        let mut min_cpu = CPU_SATURATED;

        for candidate in candidates {
            if candidate.cpu_utilization < min_cpu {
                min_cpu = candidate.cpu_utilization;
                selected = Some(candidate);
            }
        }

        selected.ok_or_else(|| Error::Selection("no shard with a usable CPU metric".to_string()))
    }
}
