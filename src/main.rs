use std::net::SocketAddr;
use std::sync::Arc;

use sharded_counters::config::{Config, Role, FORWARD_TIMEOUT};
use sharded_counters::coordination::client::KvStore;
use sharded_counters::coordination::etcd::EtcdKv;
use sharded_counters::server::{build_router, Deps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting {:?} node (shard_id={}, etcd={:?})",
        config.role,
        config.shard_id,
        config.etcd_endpoints
    );

    // 1. Coordination store client:
    let kv: Arc<dyn KvStore> = Arc::new(EtcdKv::connect(&config.etcd_endpoints).await?);

    // 2. Shared handler dependencies:
    let http = reqwest::Client::builder().timeout(FORWARD_TIMEOUT).build()?;
    let deps = Deps::new(kv, http, config.lenient_reads);

    // 3. Shard nodes advertise liveness and load:
    if config.role == Role::Shard {
        let registry = deps.registry.clone();
        let shard_id = config.shard_id.clone();
        tokio::spawn(async move {
            registry.publish_loop(shard_id).await;
        });
    }

    // 4. Start HTTP server:
    let app = build_router(deps);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
