//! Collaborator stores read by the metadata cache.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::ProxyError;
use crate::types::ProviderOverrides;

/// Lifetime of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTtl {
    /// Kept until explicitly invalidated.
    #[default]
    Permanent,
    After(Duration),
}

/// Key-value cache shared between proxies.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: Value, ttl: CacheTtl);

    async fn invalidate(&self, key: &str);
}

/// Administrator-configured model overrides.
#[async_trait]
pub trait ModelOverrideStore: Send + Sync {
    /// All overrides of a provider, keyed by operation type then model id.
    async fn list_overrides(&self, provider_id: &str) -> Result<ProviderOverrides, ProxyError>;
}
