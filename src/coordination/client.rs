use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub type KvResult<T> = std::result::Result<T, KvError>;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("key '{0}' not found")]
    NotFound(String),

    #[error("coordination call timed out after {0:?}")]
    Timeout(Duration),

    #[error("coordination transport error: {0}")]
    Transport(String),
}

impl KvError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, KvError::NotFound(_))
    }
}

/// Contract of the external coordination store.
///
/// Implementations must be safe for concurrent use; the client is shared
/// across all request handlers. Every call is bounded by a per-call deadline.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetches a key's value. Absence is `KvError::NotFound`.
    async fn get(&self, key: &str) -> KvResult<String>;

    /// Unconditionally writes a key.
    async fn put(&self, key: &str, value: String) -> KvResult<()>;

    /// Writes a key only if it does not exist yet. Returns whether this
    /// caller won the creation race.
    async fn put_if_absent(&self, key: &str, value: String) -> KvResult<bool>;

    /// Writes a key under a lease; the key disappears `ttl` after the write
    /// unless refreshed by another put.
    async fn put_with_ttl(&self, key: &str, value: String, ttl: Duration) -> KvResult<()>;

    /// Returns all keys under the given prefix.
    async fn prefix_scan(&self, prefix: &str) -> KvResult<Vec<String>>;
}
