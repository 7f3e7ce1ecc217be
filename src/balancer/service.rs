use reqwest::Method;
use serde_json::Value;

use super::strategy::SelectionStrategy;
use crate::config::SHARD_PORT;
use crate::error::{Error, Result};
use crate::registry::service::ShardRegistry;
use crate::registry::types::ShardRecord;

/// Dispatches requests to one counter's bound shard set.
///
/// Built per request from the counter's binding; holds no state beyond it.
/// The strategy is optional because the read path only filters and fans out.
pub struct ShardBalancer {
    shard_ids: Vec<String>,
    strategy: Option<Box<dyn SelectionStrategy>>,
    registry: ShardRegistry,
    http: reqwest::Client,
}

impl ShardBalancer {
    pub fn new(
        shard_ids: &[String],
        strategy: Option<Box<dyn SelectionStrategy>>,
        registry: ShardRegistry,
        http: reqwest::Client,
    ) -> Self {
        Self {
            shard_ids: shard_ids.to_vec(),
            strategy,
            registry,
            http,
        }
    }

    /// Keeps every candidate with a live, healthy heartbeat, annotated with
    /// its current metric. A failed metric fetch drops only that shard.
    pub async fn filter_healthy(&self) -> Vec<ShardRecord> {
        let mut healthy = Vec::with_capacity(self.shard_ids.len());

        for shard_id in &self.shard_ids {
            match self.registry.get_metric(shard_id).await {
                Ok(record) if record.is_healthy() => healthy.push(record),
                Ok(record) => {
                    tracing::warn!(
                        "Dropping shard {}: reported health '{}'",
                        shard_id,
                        record.health
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch metrics for shard {}: {}", shard_id, e);
                }
            }
        }

        healthy
    }

    /// Filters, selects one shard by strategy, and forwards the request to it.
    pub async fn choose_and_forward(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<String> {
        let healthy = self.filter_healthy().await;

        let strategy = self
            .strategy
            .as_ref()
            .ok_or_else(|| Error::Selection("no selection strategy configured".to_string()))?;
        let selected = strategy.select(&healthy)?;

        self.forward_to(&selected.shard_id, method, path, body, query)
            .await
    }

    /// Sends a request straight to a named shard, bypassing selection.
    /// Returns the response body on any 2xx status.
    pub async fn forward_to(
        &self,
        shard_id: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<String> {
        let url = format!("http://{}/{}", shard_addr(shard_id), path);

        let mut request = self.http.request(method.clone(), &url).query(query);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        tracing::info!(
            "Forwarding {} {} to shard {} (payload={})",
            method,
            url,
            shard_id,
            body.map(|b| b.to_string()).unwrap_or_default()
        );

        let response = request.send().await.map_err(|e| Error::ShardUnreachable {
            shard: shard_id.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::ShardUnreachable {
            shard: shard_id.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!("Shard {} replied {}: {}", shard_id, status, text);

        if !status.is_success() {
            return Err(Error::ShardStatus {
                shard: shard_id.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

/// A shard id is a routable host; bare ids get the well-known shard port.
/// Ids that already carry a port are dialed verbatim.
fn shard_addr(shard_id: &str) -> String {
    if shard_id.contains(':') {
        shard_id.to_string()
    } else {
        format!("{}:{}", shard_id, SHARD_PORT)
    }
}
