//! In-process record store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::{RecordStore, StoreError};

/// A map of key to blob held in memory, the analogue of browser storage.
///
/// Clones share the same underlying map. An optional byte quota models a
/// storage medium that refuses writes once full.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
    load_delay: Duration,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes that would push the total stored bytes past `limit`.
    #[must_use]
    pub const fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }

    /// Sleep before every read.
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Total bytes currently stored across all keys.
    pub async fn used_bytes(&self) -> usize {
        self.blobs.read().await.values().map(String::len).sum()
    }
}

impl RecordStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, blob: String) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().await;

        if let Some(limit) = self.quota {
            let others: usize = blobs
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + blob.len();
            if needed > limit {
                tracing::warn!(key, needed, limit, "Write refused: quota exceeded");
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    limit,
                });
            }
        }

        blobs.insert(key.to_owned(), blob);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.write("k", "v".to_owned()).await.unwrap();
        assert_eq!(other.read("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_quota_refuses_write_and_keeps_old_value() {
        let store = MemoryStore::new().with_quota(8);
        store.write("a", "1234".to_owned()).await.unwrap();
        store.write("a", "12345678".to_owned()).await.unwrap();

        let err = store.write("b", "x".to_owned()).await.unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 9, limit: 8, .. }));
        assert_eq!(store.read("a").await.unwrap().as_deref(), Some("12345678"));
        assert!(store.read("b").await.unwrap().is_none());
        assert_eq!(store.used_bytes().await, 8);
    }
}
