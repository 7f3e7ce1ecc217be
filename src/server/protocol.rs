//! API Data Transfer Objects and the shard endpoint paths the coordinator
//! forwards to.

use serde::{Deserialize, Serialize};

/// Shard-local increment endpoint, relative to the shard's base URL.
pub const SHARD_INCREMENT_PATH: &str = "counter/shard/increment";
/// Shard-local decrement endpoint.
pub const SHARD_DECREMENT_PATH: &str = "counter/shard/decrement";
/// Shard-local read endpoint.
pub const SHARD_VALUE_PATH: &str = "counter/shard";

/// Body of `POST /counter/test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCounterRequest {
    pub name: String,
}

/// Payload returned after creating a counter.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCounterResponse {
    pub counter_id: String,
    pub counter_name: String,
    pub shards: Vec<String>,
}

/// Body of the increment/decrement endpoints, on both the coordinator and
/// the shard side; the coordinator forwards it verbatim.
#[derive(Debug, Serialize, Deserialize)]
pub struct CounterOpRequest {
    pub counter_id: String,
}

/// Query string of the read endpoints.
#[derive(Debug, Deserialize)]
pub struct CounterQuery {
    #[serde(default)]
    pub counter_id: String,
}

/// A counter value: a shard's partial, or the coordinator's aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct CounterValue {
    pub counter_id: String,
    pub value: i64,
    /// Set only by lenient aggregate reads that had to skip dead shards.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}
