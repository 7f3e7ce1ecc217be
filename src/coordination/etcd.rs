use async_trait::async_trait;
use etcd_client::{Client, Compare, CompareOp, ConnectOptions, GetOptions, PutOptions, Txn, TxnOp};
use std::future::Future;
use std::time::Duration;

use super::client::{KvError, KvResult, KvStore};
use crate::config::COORDINATION_TIMEOUT;

/// Coordination client backed by an etcd cluster.
///
/// The inner client is cheap to clone and safe to share; each call clones it
/// and runs under the configured deadline.
pub struct EtcdKv {
    client: Client,
    call_timeout: Duration,
}

impl EtcdKv {
    pub async fn connect(endpoints: &[String]) -> KvResult<Self> {
        let options = ConnectOptions::new().with_connect_timeout(COORDINATION_TIMEOUT);
        let client = Client::connect(endpoints, Some(options))
            .await
            .map_err(|e| KvError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            call_timeout: COORDINATION_TIMEOUT,
        })
    }

    async fn bounded<T, F>(&self, call: F) -> KvResult<T>
    where
        F: Future<Output = std::result::Result<T, etcd_client::Error>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(KvError::Transport(e.to_string())),
            Err(_) => Err(KvError::Timeout(self.call_timeout)),
        }
    }
}

#[async_trait]
impl KvStore for EtcdKv {
    async fn get(&self, key: &str) -> KvResult<String> {
        let mut client = self.client.clone();
        let key_owned = key.to_string();
        let response = self
            .bounded(async move { client.get(key_owned, None).await })
            .await?;

        match response.kvs().first() {
            Some(kv) => kv
                .value_str()
                .map(|value| value.to_string())
                .map_err(|e| KvError::Transport(e.to_string())),
            None => Err(KvError::NotFound(key.to_string())),
        }
    }

    async fn put(&self, key: &str, value: String) -> KvResult<()> {
        let mut client = self.client.clone();
        let key_owned = key.to_string();
        self.bounded(async move {
            client.put(key_owned, value, None).await?;
            Ok(())
        })
        .await
    }

    async fn put_if_absent(&self, key: &str, value: String) -> KvResult<bool> {
        let mut client = self.client.clone();
        // Version 0 means the key has never been written.
        let txn = Txn::new()
            .when(vec![Compare::version(key, CompareOp::Equal, 0)])
            .and_then(vec![TxnOp::put(key, value, None)]);
        let response = self.bounded(async move { client.txn(txn).await }).await?;
        Ok(response.succeeded())
    }

    async fn put_with_ttl(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        let mut client = self.client.clone();
        let key_owned = key.to_string();
        self.bounded(async move {
            let lease = client.lease_grant(ttl.as_secs() as i64, None).await?;
            let options = PutOptions::new().with_lease(lease.id());
            client.put(key_owned, value, Some(options)).await?;
            Ok(())
        })
        .await
    }

    async fn prefix_scan(&self, prefix: &str) -> KvResult<Vec<String>> {
        let mut client = self.client.clone();
        let prefix_owned = prefix.to_string();
        let response = self
            .bounded(async move {
                client
                    .get(prefix_owned, Some(GetOptions::new().with_prefix()))
                    .await
            })
            .await?;

        let mut keys = Vec::with_capacity(response.kvs().len());
        for kv in response.kvs() {
            let key = kv
                .key_str()
                .map_err(|e| KvError::Transport(e.to_string()))?;
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
