//! Proxy configuration.

use serde::{Deserialize, Serialize};

use crate::cache::MetadataCache;
use crate::defaults;
use crate::traits::CacheTtl;
use crate::types::ConfigMap;

/// Settings shared by every proxy a factory creates.
///
/// ```rust,ignore
/// let config: ProxyConfig = serde_json::from_str(r#"{ "cache_key_prefix": "ai:api_definition:" }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Prefix of API definition cache keys.
    pub cache_key_prefix: String,
    /// API definition lifetime in seconds; `None` keeps it until invalidated.
    pub api_definition_ttl_secs: Option<u64>,
    /// Base configuration installed on new proxies.
    pub base_configuration: ConfigMap,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_key_prefix: defaults::API_DEFINITION_KEY_PREFIX.to_string(),
            api_definition_ttl_secs: defaults::API_DEFINITION_TTL_SECS,
            base_configuration: ConfigMap::new(),
        }
    }
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = prefix.into();
        self
    }

    pub fn with_api_definition_ttl_secs(mut self, secs: Option<u64>) -> Self {
        self.api_definition_ttl_secs = secs;
        self
    }

    pub fn with_base_configuration(mut self, configuration: ConfigMap) -> Self {
        self.base_configuration = configuration;
        self
    }

    pub fn api_definition_ttl(&self) -> CacheTtl {
        crate::cache::ttl_from_secs(self.api_definition_ttl_secs)
    }

    pub(crate) fn apply_to(&self, cache: MetadataCache) -> MetadataCache {
        cache
            .with_key_prefix(self.cache_key_prefix.clone())
            .with_api_definition_ttl(self.api_definition_ttl())
    }
}
