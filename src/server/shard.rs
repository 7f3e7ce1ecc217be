//! Shard API Handlers
//!
//! Operate only against this node's local partial-counter store. Each write
//! moves the local partial by exactly one and replies with the post-update
//! value; reads reply with the current partial, zero for ids this shard has
//! never written.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::envelope::{success, ApiResponse};
use super::protocol::{CounterOpRequest, CounterQuery, CounterValue};
use super::Deps;
use crate::error::{Error, Result};

/// `PUT /counter/shard/increment`
pub async fn handle_increment(
    Extension(deps): Extension<Deps>,
    Json(req): Json<CounterOpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CounterValue>>)> {
    if req.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let value = deps.counters.increment(&req.counter_id);
    Ok(success(
        "Shard counter incremented",
        Some(CounterValue {
            counter_id: req.counter_id,
            value,
            degraded: false,
        }),
    ))
}

/// `PUT /counter/shard/decrement`
pub async fn handle_decrement(
    Extension(deps): Extension<Deps>,
    Json(req): Json<CounterOpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CounterValue>>)> {
    if req.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let value = deps.counters.decrement(&req.counter_id);
    Ok(success(
        "Shard counter decremented",
        Some(CounterValue {
            counter_id: req.counter_id,
            value,
            degraded: false,
        }),
    ))
}

/// `GET /counter/shard?counter_id=`
pub async fn handle_get(
    Extension(deps): Extension<Deps>,
    Query(params): Query<CounterQuery>,
) -> Result<(StatusCode, Json<ApiResponse<CounterValue>>)> {
    if params.counter_id.trim().is_empty() {
        return Err(Error::BadRequest("Counter ID is required".to_string()));
    }

    let value = deps.counters.get(&params.counter_id);
    Ok(success(
        "Shard counter value",
        Some(CounterValue {
            counter_id: params.counter_id,
            value,
            degraded: false,
        }),
    ))
}
