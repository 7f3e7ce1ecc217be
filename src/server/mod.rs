//! HTTP API
//!
//! Exposes the client-facing coordinator endpoints and the shard-local
//! endpoints from a single router; both roles run the same route set and
//! differ only in which background jobs they spawn. Handlers receive their
//! dependencies through one `Deps` extension constructed at startup.
//!
//! ## Submodules
//! - **`coordinator`**: create / increment / decrement / aggregate-read.
//! - **`shard`**: shard-local increment / decrement / read.
//! - **`envelope`**: the uniform response envelope every endpoint uses.
//! - **`protocol`**: request/response DTOs and shard endpoint paths.
//! - **`middleware`**: request logging.

pub mod coordinator;
pub mod envelope;
pub mod middleware;
pub mod protocol;
pub mod shard;


use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use std::sync::Arc;

use crate::coordination::client::KvStore;
use crate::metadata::store::CounterBindings;
use crate::registry::service::ShardRegistry;
use crate::store::counter::CounterStore;
use envelope::{success, ApiResponse};

/// Handler dependencies, built once at startup and shared by reference.
#[derive(Clone)]
pub struct Deps {
    pub registry: ShardRegistry,
    pub bindings: CounterBindings,
    pub counters: Arc<CounterStore>,
    pub http: reqwest::Client,
    pub lenient_reads: bool,
}

impl Deps {
    pub fn new(kv: Arc<dyn KvStore>, http: reqwest::Client, lenient_reads: bool) -> Self {
        let registry = ShardRegistry::new(kv.clone());
        let bindings = CounterBindings::new(kv, registry.clone());

        Self {
            registry,
            bindings,
            counters: Arc::new(CounterStore::new()),
            http,
            lenient_reads,
        }
    }
}

pub fn build_router(deps: Deps) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/counter/test", post(coordinator::handle_create_counter))
        .route("/counter/increment", put(coordinator::handle_increment))
        .route("/counter/decrement", put(coordinator::handle_decrement))
        .route("/counter", get(coordinator::handle_get))
        .route("/counter/shard/increment", put(shard::handle_increment))
        .route("/counter/shard/decrement", put(shard::handle_decrement))
        .route("/counter/shard", get(shard::handle_get))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(Extension(deps))
}

async fn handle_health() -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    success("ok", None)
}
