use crate::application_port::*;
use crate::domain_port::SessionCache;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct MemEntry {
    value: String,
    expires_at: Instant,
}

impl MemEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory session cache for tests and single-process runs. Expiry is
/// checked lazily on read; a ttl of zero means the entry is already dead.
pub struct MemSessionCache {
    entries: DashMap<String, MemEntry>,
}

impl MemSessionCache {
    pub fn new() -> Self {
        MemSessionCache {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemSessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionCache for MemSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Drop expired entries on the way out so the map does not grow.
        self.entries.remove_if(key, |_, e| e.is_expired());
        Ok(None)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), AuthError> {
        self.entries.insert(
            key.to_string(),
            MemEntry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.entries.remove(key) {
            Some((_, entry)) if !entry.is_expired() => Ok(Some(entry.value)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let cache = MemSessionCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let cache = MemSessionCache::new();
        cache.set_with_expiry("k", "v1", 60).await.unwrap();
        cache.set_with_expiry("k", "v2", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn zero_ttl_entry_is_dead_on_read() {
        let cache = MemSessionCache::new();
        cache.set_with_expiry("k", "v", 0).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.get_and_delete("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemSessionCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_and_delete_consumes_the_entry() {
        let cache = MemSessionCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();
        assert_eq!(
            cache.get_and_delete("k").await.unwrap().as_deref(),
            Some("v")
        );
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.get_and_delete("k").await.unwrap(), None);
    }
}
