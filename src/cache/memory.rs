//! In-memory collaborators.

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as TokioMutex, RwLock};

use crate::error::ProxyError;
use crate::traits::{CacheStore, CacheTtl, ModelOverrideStore};
use crate::types::{ModelOverride, OperationType, ProviderOverrides};

struct CacheEntry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

struct Entries {
    // Never evicted; removed only by `invalidate`.
    permanent: HashMap<String, Value>,
    expiring: LruCache<String, CacheEntry>,
}

/// In-memory cache store.
///
/// Permanent entries live until invalidated. Entries with a TTL are held in
/// an LRU bounded by `capacity` and dropped once expired.
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Arc<TokioMutex<Entries>>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(crate::defaults::MEMORY_CACHE_CAPACITY)
    }
}

impl MemoryCacheStore {
    /// Store holding at most `capacity` expiring entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(TokioMutex::new(Entries {
                permanent: HashMap::new(),
                expiring: LruCache::new(capacity),
            })),
        }
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.permanent.len() + entries.expiring.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        if let Some(value) = entries.permanent.get(key) {
            return Some(value.clone());
        }
        if let Some(entry) = entries.expiring.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
            entries.expiring.pop(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: CacheTtl) {
        let mut entries = self.entries.lock().await;
        match ttl {
            CacheTtl::Permanent => {
                entries.expiring.pop(key);
                entries.permanent.insert(key.to_string(), value);
            }
            CacheTtl::After(ttl) => {
                entries.permanent.remove(key);
                entries.expiring.put(key.to_string(), CacheEntry::new(value, ttl));
            }
        }
    }

    async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.permanent.remove(key);
        entries.expiring.pop(key);
    }
}

/// Override store backed by a map, editable at runtime.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverrideStore {
    overrides: Arc<RwLock<HashMap<String, ProviderOverrides>>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_override(
        &self,
        provider_id: &str,
        operation_type: OperationType,
        model_id: impl Into<String>,
        entry: ModelOverride,
    ) {
        let mut overrides = self.overrides.write().await;
        overrides
            .entry(provider_id.to_string())
            .or_default()
            .entry(operation_type)
            .or_default()
            .insert(model_id.into(), entry);
    }

    pub async fn remove_override(&self, provider_id: &str, operation_type: &OperationType, model_id: &str) {
        let mut overrides = self.overrides.write().await;
        if let Some(models) = overrides
            .get_mut(provider_id)
            .and_then(|ops| ops.get_mut(operation_type))
        {
            models.remove(model_id);
        }
    }
}

#[async_trait]
impl ModelOverrideStore for MemoryOverrideStore {
    async fn list_overrides(&self, provider_id: &str) -> Result<ProviderOverrides, ProxyError> {
        Ok(self
            .overrides
            .read()
            .await
            .get(provider_id)
            .cloned()
            .unwrap_or_default())
    }
}
