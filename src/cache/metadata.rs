use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProviderError, ProxyError};
use crate::traits::{CacheStore, CacheTtl, ModelOverrideStore, ProviderClient};
use crate::types::{ApiDefinition, ModelCapability, ModelList, ModelOverride, OperationType};

/// Cached API definitions and override-merged model lists.
#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn CacheStore>,
    overrides: Option<Arc<dyn ModelOverrideStore>>,
    key_prefix: String,
    api_definition_ttl: CacheTtl,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("key_prefix", &self.key_prefix)
            .field("api_definition_ttl", &self.api_definition_ttl)
            .field("has_override_store", &self.overrides.is_some())
            .finish()
    }
}

impl MetadataCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            overrides: None,
            key_prefix: crate::defaults::API_DEFINITION_KEY_PREFIX.to_string(),
            api_definition_ttl: ttl_from_secs(crate::defaults::API_DEFINITION_TTL_SECS),
        }
    }

    pub fn with_override_store(mut self, overrides: Arc<dyn ModelOverrideStore>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_api_definition_ttl(mut self, ttl: CacheTtl) -> Self {
        self.api_definition_ttl = ttl;
        self
    }

    pub fn api_definition_key(&self, provider_id: &str) -> String {
        format!("{}{}", self.key_prefix, provider_id)
    }

    /// API definition of `provider`, computed on first use and cached.
    ///
    /// Concurrent first calls may both compute it; the last write wins.
    pub async fn get_api_definition(
        &self,
        provider: &dyn ProviderClient,
    ) -> Result<ApiDefinition, ProviderError> {
        let key = self.api_definition_key(&provider.provider_id());
        if let Some(cached) = self.store.get(&key).await {
            match serde_json::from_value::<ApiDefinition>(cached) {
                Ok(definition) => return Ok(definition),
                Err(e) => {
                    tracing::warn!(target: "siumai_proxy::cache", %key, error = %e, "discarding undecodable API definition");
                }
            }
        }

        let definition = provider.api_definition().await?;
        let encoded = serde_json::to_value(&definition)?;
        self.store.set(&key, encoded, self.api_definition_ttl).await;
        tracing::debug!(target: "siumai_proxy::cache", %key, operations = definition.operations.len(), "cached API definition");
        Ok(definition)
    }

    pub async fn invalidate_api_definition(&self, provider_id: &str) {
        let key = self.api_definition_key(provider_id);
        self.store.invalidate(&key).await;
    }

    /// Native model list of `provider` with admin overrides layered on top.
    ///
    /// An override with a non-empty label replaces the native label or adds the
    /// model; unlabeled overrides are ignored. Without an operation type the
    /// native list is returned unchanged. Never cached.
    pub async fn get_configured_models(
        &self,
        provider: &dyn ProviderClient,
        operation_type: Option<&OperationType>,
        capabilities: &[ModelCapability],
    ) -> Result<ModelList, ProviderError> {
        let mut models = provider.configured_models(operation_type, capabilities).await?;

        let (Some(operation_type), Some(store)) = (operation_type, &self.overrides) else {
            return Ok(models);
        };

        let overrides = store.list_overrides(&provider.provider_id()).await?;
        if let Some(entries) = overrides.get(operation_type) {
            for (model_id, entry) in entries {
                if let Some(label) = entry.effective_label() {
                    models.insert(model_id.clone(), label.to_string());
                }
            }
        }
        Ok(models)
    }

    /// Override entry for one model, if the admin configured one.
    pub async fn model_override(
        &self,
        provider_id: &str,
        operation_type: &OperationType,
        model_id: &str,
    ) -> Result<Option<ModelOverride>, ProxyError> {
        let Some(store) = &self.overrides else {
            return Ok(None);
        };
        let mut overrides = store.list_overrides(provider_id).await?;
        Ok(overrides
            .get_mut(operation_type)
            .and_then(|models| models.remove(model_id)))
    }
}

pub(crate) fn ttl_from_secs(secs: Option<u64>) -> CacheTtl {
    secs.map_or(CacheTtl::Permanent, |s| CacheTtl::After(Duration::from_secs(s)))
}
