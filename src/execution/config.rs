//! Effective configuration of one call.
//!
//! Layers, later wins:
//! 1. provider defaults
//! 2. required defaults declared in the provider's API definition
//! 3. admin settings for the targeted model
//! 4. the proxy's base configuration
//!
//! Pre-call observers may still change the result afterwards.

use crate::cache::MetadataCache;
use crate::error::ProviderError;
use crate::traits::ProviderClient;
use crate::types::{ConfigMap, OperationType, merge_config};

pub struct ConfigResolver<'a> {
    cache: &'a MetadataCache,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self { cache }
    }

    pub async fn resolve(
        &self,
        provider: &dyn ProviderClient,
        operation_type: &OperationType,
        model_id: &str,
        base: &ConfigMap,
    ) -> Result<ConfigMap, ProviderError> {
        let provider_defaults = provider.default_configuration(operation_type, model_id);
        let definition = self.cache.get_api_definition(provider).await?;
        let model_settings = self
            .cache
            .model_override(&provider.provider_id(), operation_type, model_id)
            .await?
            .map(|entry| entry.settings)
            .unwrap_or_default();

        Ok(Self::layer(&[
            &provider_defaults,
            &definition.required_defaults(operation_type),
            &model_settings,
            base,
        ]))
    }

    /// Merge `layers` in order.
    pub fn layer(layers: &[&ConfigMap]) -> ConfigMap {
        let mut merged = ConfigMap::new();
        for layer in layers {
            merge_config(&mut merged, layer);
        }
        merged
    }
}
