//! End-to-end cluster scenarios: real shard servers on ephemeral ports, a
//! coordinator router in front, and a shared in-memory coordination store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sharded_counters::coordination::client::KvStore;
use sharded_counters::coordination::memory::MemoryKv;
use sharded_counters::registry::types::{now_ms, ShardRecord, HEALTH_OK};
use sharded_counters::server::{build_router, Deps};

/// Starts a shard node: its own deps (and so its own partial-counter store)
/// over the shared coordination store, served on an ephemeral port.
async fn spawn_shard(kv: Arc<MemoryKv>) -> SocketAddr {
    let deps = Deps::new(kv, reqwest::Client::new(), false);
    let app = build_router(deps);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn seed_heartbeat(kv: &MemoryKv, shard_id: &str, cpu: f64) {
    let record = ShardRecord {
        shard_id: shard_id.to_string(),
        cpu_utilization: cpu,
        health: HEALTH_OK.to_string(),
        updated_time: now_ms(),
    };
    kv.put_with_ttl(
        &ShardRecord::key(shard_id),
        serde_json::to_string(&record).unwrap(),
        Duration::from_secs(6),
    )
    .await
    .unwrap();
}

fn coordinator(kv: Arc<MemoryKv>, lenient_reads: bool) -> Router {
    build_router(Deps::new(kv, reqwest::Client::new(), lenient_reads))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn shard_partial(addr: &SocketAddr, counter_id: &str) -> i64 {
    let url = format!("http://{}/counter/shard?counter_id={}", addr, counter_id);
    let body: Value = reqwest::get(url).await.unwrap().json().await.unwrap();
    body["data"]["value"].as_i64().unwrap()
}

#[tokio::test]
async fn test_single_shard_linear_counting() {
    let kv = Arc::new(MemoryKv::new());
    let shard = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &shard.to_string(), 20.0).await;

    let app = coordinator(kv, false);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/counter/test", json!({"name": "a"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["shards"], json!([shard.to_string()]));
    let counter_id = body["data"]["counter_id"].as_str().unwrap().to_string();

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": counter_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/counter?counter_id={}", counter_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["value"], json!(10));
}

#[tokio::test]
async fn test_two_shards_partials_sum_to_total() {
    let kv = Arc::new(MemoryKv::new());
    let shard_a = spawn_shard(kv.clone()).await;
    let shard_b = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &shard_a.to_string(), 20.0).await;
    seed_heartbeat(&kv, &shard_b.to_string(), 20.0).await;

    let app = coordinator(kv, false);

    // First increment creates the binding over both live shards.
    for _ in 0..6 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "y"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let partial_a = shard_partial(&shard_a, "y").await;
    let partial_b = shard_partial(&shard_b, "y").await;
    assert_eq!(partial_a + partial_b, 6);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/counter?counter_id=y")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["value"], json!(6));
    assert!(body["data"].get("degraded").is_none());
}

#[tokio::test]
async fn test_metric_driven_selection_prefers_idle_shard() {
    let kv = Arc::new(MemoryKv::new());
    let idle = spawn_shard(kv.clone()).await;
    let busy = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &idle.to_string(), 10.0).await;
    seed_heartbeat(&kv, &busy.to_string(), 90.0).await;

    let app = coordinator(kv, false);

    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "v"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(shard_partial(&idle, "v").await, 20);
    assert_eq!(shard_partial(&busy, "v").await, 0);
}

#[tokio::test]
async fn test_decrement_lands_on_bound_shard() {
    let kv = Arc::new(MemoryKv::new());
    let shard = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &shard.to_string(), 20.0).await;

    let app = coordinator(kv, false);

    for _ in 0..3 {
        app.clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "z"}),
            ))
            .await
            .unwrap();
    }
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/counter/decrement",
            json!({"counter_id": "z"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/counter?counter_id=z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["value"], json!(2));
}

#[tokio::test]
async fn test_dead_bound_shard_fails_strict_read() {
    let kv = Arc::new(MemoryKv::new());
    let alive = spawn_shard(kv.clone()).await;
    let doomed = spawn_shard(kv.clone()).await;
    // The doomed shard reports high CPU so every write lands on the survivor.
    seed_heartbeat(&kv, &alive.to_string(), 10.0).await;
    seed_heartbeat(&kv, &doomed.to_string(), 90.0).await;

    let app = coordinator(kv.clone(), false);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "d"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // The doomed shard stops heartbeating; its lease runs out.
    kv.remove(&ShardRecord::key(&doomed.to_string()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/counter?counter_id=d")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_dead_bound_shard_degrades_lenient_read() {
    let kv = Arc::new(MemoryKv::new());
    let alive = spawn_shard(kv.clone()).await;
    let doomed = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &alive.to_string(), 10.0).await;
    seed_heartbeat(&kv, &doomed.to_string(), 90.0).await;

    let strict = coordinator(kv.clone(), false);
    for _ in 0..3 {
        strict
            .clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "d"}),
            ))
            .await
            .unwrap();
    }

    kv.remove(&ShardRecord::key(&doomed.to_string()));

    let lenient = coordinator(kv, true);
    let response = lenient
        .oneshot(
            Request::builder()
                .uri("/counter?counter_id=d")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["value"], json!(3));
    assert_eq!(body["data"]["degraded"], json!(true));
}

#[tokio::test]
async fn test_operations_on_distinct_counters_are_independent() {
    let kv = Arc::new(MemoryKv::new());
    let shard = spawn_shard(kv.clone()).await;
    seed_heartbeat(&kv, &shard.to_string(), 20.0).await;

    let app = coordinator(kv, false);

    for _ in 0..5 {
        app.clone()
            .oneshot(json_request(
                "PUT",
                "/counter/increment",
                json!({"counter_id": "c1"}),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(json_request(
            "PUT",
            "/counter/increment",
            json!({"counter_id": "c2"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/counter?counter_id=c2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["value"], json!(1));
}
