//! Counter Metadata
//!
//! Persistent binding of a counter id to the ordered set of shards that hold
//! its partial values. A binding is written once, when a counter id is first
//! seen, and never changes afterwards. Rebalancing is out of scope, so the
//! shard set a counter starts with is the shard set it keeps.

pub mod store;
