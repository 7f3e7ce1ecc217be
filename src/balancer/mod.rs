//! Shard Load Balancer
//!
//! Dispatches a write to exactly one of a counter's bound shards, and gives
//! the read path a filtered view of which bound shards are currently healthy.
//!
//! ## Core Mechanisms
//! - **Filtering**: each candidate's heartbeat record is fetched from the
//!   registry; candidates without a live, healthy record are dropped. A
//!   metric fetch failing for one shard never fails the whole filter.
//! - **Selection**: a pluggable, stateless strategy picks one shard from the
//!   filtered set. The reference strategy takes the least-loaded CPU.
//! - **Forwarding**: the chosen shard is called over HTTP with the original
//!   request body. Network failures and non-2xx replies are reported as
//!   distinct errors; there is no retry on another shard, so a write lands
//!   on at most one shard.

pub mod service;
pub mod strategy;
