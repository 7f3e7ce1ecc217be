//! Coordinator API Handlers
//!
//! The client-facing front door: resolves counter bindings from the metadata
//! plane, dispatches writes through the load balancer, and aggregates reads
//! across a counter's bound shards.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};
use reqwest::Method;

use super::envelope::{success, ApiResponse};
use super::protocol::{
    CounterOpRequest, CounterQuery, CounterValue, CreateCounterRequest, CreateCounterResponse,
    SHARD_DECREMENT_PATH, SHARD_INCREMENT_PATH, SHARD_VALUE_PATH,
};
use super::Deps;
use crate::balancer::service::ShardBalancer;
use crate::balancer::strategy::LeastCpuStrategy;
use crate::error::{Error, Result};
use crate::ids::new_counter_id;

/// `POST /counter/test`: creates a counter and binds it to the live shard set.
pub async fn handle_create_counter(
    Extension(deps): Extension<Deps>,
    Json(req): Json<CreateCounterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateCounterResponse>>)> {
    if req.name.trim().is_empty() {
        return Err(Error::BadRequest("Counter name is required".to_string()));
    }

    let counter_id = new_counter_id();
    let shards = deps.bindings.load_or_assign(&counter_id).await?;

    Ok(success(
        "Counter created",
        Some(CreateCounterResponse {
            counter_id,
            counter_name: req.name,
            shards,
        }),
    ))
}

/// `PUT /counter/increment`: dispatches an increment to one bound shard.
///
/// The first increment of an unseen counter id creates its binding.
pub async fn handle_increment(
    Extension(deps): Extension<Deps>,
    Json(req): Json<CounterOpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    if req.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let shards = deps.bindings.load_or_assign(&req.counter_id).await?;
    dispatch_write(&deps, &shards, SHARD_INCREMENT_PATH, &req).await?;

    Ok(success("Counter incremented", None))
}

/// `PUT /counter/decrement`: dispatches a decrement to one bound shard.
///
/// Unlike increment, a decrement never creates a binding: decrementing an
/// unknown counter is a client error.
pub async fn handle_decrement(
    Extension(deps): Extension<Deps>,
    Json(req): Json<CounterOpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    if req.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let shards = deps
        .bindings
        .load(&req.counter_id)
        .await
        .map_err(reject_unknown_counter)?;
    dispatch_write(&deps, &shards, SHARD_DECREMENT_PATH, &req).await?;

    Ok(success("Counter decremented", None))
}

/// `GET /counter?counter_id=`: fans a read out to the counter's bound
/// shards and sums their partial values.
pub async fn handle_get(
    Extension(deps): Extension<Deps>,
    Query(params): Query<CounterQuery>,
) -> Result<(StatusCode, Json<ApiResponse<CounterValue>>)> {
    if params.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let shards = deps
        .bindings
        .load(&params.counter_id)
        .await
        .map_err(reject_unknown_counter)?;

    let balancer = ShardBalancer::new(&shards, None, deps.registry.clone(), deps.http.clone());
    let healthy = balancer.filter_healthy().await;

    let degraded = healthy.len() < shards.len();
    if degraded && !deps.lenient_reads {
        let missing = shards
            .iter()
            .find(|id| !healthy.iter().any(|record| &record.shard_id == *id))
            .cloned()
            .unwrap_or_default();
        return Err(Error::ShardUnreachable {
            shard: missing,
            reason: "no live heartbeat; partial read refused".to_string(),
        });
    }

    let mut value: i64 = 0;
    for shard in &healthy {
        let body = balancer
            .forward_to(
                &shard.shard_id,
                Method::GET,
                SHARD_VALUE_PATH,
                None,
                &[("counter_id", params.counter_id.as_str())],
            )
            .await?;

        let reply: ApiResponse<CounterValue> = serde_json::from_str(&body)?;
        let partial = reply.data.ok_or_else(|| {
            Error::Internal(format!("shard {} reply carried no counter data", shard.shard_id))
        })?;
        value += partial.value;
    }

    Ok(success(
        "Counter value retrieved",
        Some(CounterValue {
            counter_id: params.counter_id,
            value,
            degraded,
        }),
    ))
}

/// Picks one healthy bound shard by least CPU and forwards the write to it.
async fn dispatch_write(
    deps: &Deps,
    shards: &[String],
    path: &str,
    req: &CounterOpRequest,
) -> Result<()> {
    let balancer = ShardBalancer::new(
        shards,
        Some(Box::new(LeastCpuStrategy)),
        deps.registry.clone(),
        deps.http.clone(),
    );

    let body = serde_json::to_value(req)?;
    balancer
        .choose_and_forward(Method::PUT, path, Some(&body), &[])
        .await?;
    Ok(())
}

fn reject_unknown_counter(err: Error) -> Error {
    if err.is_not_found() {
        Error::BadRequest("Counter ID does not exist".to_string())
    } else {
        err
    }
}
