//! Shared capability tables.
//!
//! Tables are built once per provider type during startup, then the registry is
//! frozen and shared read-only. A process-wide registry can be installed once.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::introspector::CapabilityTable;
use crate::traits::ProviderClient;

static GLOBAL_REGISTRY: OnceLock<Arc<CapabilityRegistry>> = OnceLock::new();

/// Install the process-wide registry. Returns `false` when one is already installed.
pub fn install_global_registry(registry: CapabilityRegistry) -> bool {
    GLOBAL_REGISTRY.set(Arc::new(registry)).is_ok()
}

pub fn global_registry() -> Option<Arc<CapabilityRegistry>> {
    GLOBAL_REGISTRY.get().cloned()
}

/// Builder collecting capability tables before freezing.
#[derive(Debug, Default)]
pub struct CapabilityRegistryBuilder {
    tables: HashMap<&'static str, Arc<CapabilityTable>>,
}

impl CapabilityRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and store the table of the provider's type. A type registered
    /// twice keeps its first table.
    pub fn register(mut self, provider: &dyn ProviderClient) -> Self {
        let type_name = provider.type_name();
        if self.tables.contains_key(type_name) {
            tracing::debug!(target: "siumai_proxy::capability", type_name, "provider type already registered");
            return self;
        }
        let table = CapabilityTable::for_provider(provider);
        tracing::debug!(
            target: "siumai_proxy::capability",
            type_name,
            provider_id = %provider.provider_id(),
            operations = table.operation_types().count(),
            "registered capability table"
        );
        self.tables.insert(type_name, Arc::new(table));
        self
    }

    pub fn register_table(mut self, table: CapabilityTable) -> Self {
        self.tables
            .entry(table.type_name())
            .or_insert_with(|| Arc::new(table));
        self
    }

    pub fn build(self) -> CapabilityRegistry {
        CapabilityRegistry {
            tables: self.tables,
        }
    }
}

/// Frozen, read-only set of capability tables keyed by provider type.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tables: HashMap<&'static str, Arc<CapabilityTable>>,
}

impl CapabilityRegistry {
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::new()
    }

    pub fn table_for(&self, provider: &dyn ProviderClient) -> Option<Arc<CapabilityTable>> {
        self.tables.get(provider.type_name()).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::InterfaceDescriptor;

    #[test]
    fn first_registration_wins() {
        let first = CapabilityTable::build(
            "t",
            &[InterfaceDescriptor::operation("ChatInterface")],
            &["chat".to_string()],
        );
        let second = CapabilityTable::build("t", &[], &["chat".to_string()]);
        let registry = CapabilityRegistry::builder()
            .register_table(first)
            .register_table(second)
            .build();
        assert_eq!(registry.len(), 1);
        let table = registry.tables.get("t").unwrap();
        assert!(table.is_trigger_method("chat", "p").unwrap());
    }
}
