use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Previews kept before the oldest is evicted
pub const DEFAULT_MAX_PREVIEWS: usize = 64;

/// Rendered preview ready to be served
#[derive(Clone)]
pub struct CachedPreview {
    /// Rendered PNG bytes
    pub png_bytes: Vec<u8>,
    /// When this preview was rendered
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, CachedPreview>,
    order: VecDeque<String>,
}

/// Bounded cache of rendered previews, keyed by content hash
pub struct PreviewCache {
    entries: Arc<RwLock<Entries>>,
    max_entries: usize,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PREVIEWS)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            max_entries: max_entries.max(1),
        }
    }

    /// Store PNG bytes and return their key.
    ///
    /// Storing the same bytes twice keeps a single entry.
    pub async fn store(&self, png_bytes: Vec<u8>) -> String {
        let key = content_key(&png_bytes);
        let mut entries = self.entries.write().await;

        if !entries.map.contains_key(&key) {
            entries.order.push_back(key.clone());
            while entries.order.len() > self.max_entries {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.map.remove(&oldest);
                    tracing::debug!(key = %oldest, "Evicted cached preview");
                }
            }
        }

        entries.map.insert(
            key.clone(),
            CachedPreview {
                png_bytes,
                generated_at: chrono::Utc::now(),
            },
        );
        key
    }

    pub async fn get(&self, key: &str) -> Option<CachedPreview> {
        let entries = self.entries.read().await;
        entries.map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_key(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_get() {
        let cache = PreviewCache::new();
        let key = cache.store(vec![1, 2, 3]).await;

        assert_eq!(key.len(), 64);
        assert_eq!(cache.get(&key).await.unwrap().png_bytes, vec![1, 2, 3]);
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_same_bytes_share_key() {
        let cache = PreviewCache::new();
        let a = cache.store(vec![9; 10]).await;
        let b = cache.store(vec![9; 10]).await;

        assert_eq!(a, b);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_oldest_evicted() {
        let cache = PreviewCache::with_capacity(2);
        let first = cache.store(vec![1]).await;
        let second = cache.store(vec![2]).await;
        let third = cache.store(vec![3]).await;

        assert!(cache.get(&first).await.is_none());
        assert!(cache.get(&second).await.is_some());
        assert!(cache.get(&third).await.is_some());
        assert_eq!(cache.len().await, 2);
    }

    #[test]
    fn test_content_key_is_sha256_hex() {
        assert_eq!(
            content_key(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
