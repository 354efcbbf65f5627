//! Trigger-method detection.

use std::collections::BTreeMap;

use super::descriptor::InterfaceDescriptor;
use crate::error::ProxyError;
use crate::traits::ProviderClient;
use crate::types::{OperationType, canonical_name};

#[derive(Debug, Clone)]
struct MethodEntry {
    declared: String,
    operation_type: Option<OperationType>,
}

/// Method table of one provider type, keyed by canonical method name.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    type_name: &'static str,
    methods: BTreeMap<String, MethodEntry>,
}

impl CapabilityTable {
    /// Classify `methods` against `interfaces`.
    ///
    /// The operation type of a trigger method is the snake_case form of the
    /// method name as declared.
    pub fn build(
        type_name: &'static str,
        interfaces: &[InterfaceDescriptor],
        methods: &[String],
    ) -> Self {
        let operation_keys: Vec<String> = interfaces
            .iter()
            .filter(|iface| iface.extends_operation_type)
            .map(InterfaceDescriptor::canonical_key)
            .collect();

        let methods = methods
            .iter()
            .map(|declared| {
                let key = canonical_name(declared);
                let operation_type = operation_keys
                    .iter()
                    .any(|k| *k == key)
                    .then(|| OperationType::from_method_name(declared));
                (
                    key,
                    MethodEntry {
                        declared: declared.clone(),
                        operation_type,
                    },
                )
            })
            .collect();

        Self { type_name, methods }
    }

    pub fn for_provider(provider: &dyn ProviderClient) -> Self {
        Self::build(provider.type_name(), &provider.interfaces(), &provider.methods())
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Method name as the provider declared it.
    pub fn declared_name(&self, method: &str) -> Option<&str> {
        self.methods
            .get(&canonical_name(method))
            .map(|e| e.declared.as_str())
    }

    /// Operation type of a trigger method; `None` for plain or unknown methods.
    pub fn operation_type(&self, method: &str) -> Option<&OperationType> {
        self.methods
            .get(&canonical_name(method))
            .and_then(|e| e.operation_type.as_ref())
    }

    /// Whether `method` is a trigger method. Unknown methods are an error.
    pub fn is_trigger_method(&self, method: &str, provider_id: &str) -> Result<bool, ProxyError> {
        match self.methods.get(&canonical_name(method)) {
            Some(entry) => Ok(entry.operation_type.is_some()),
            None => Err(ProxyError::method_not_found(method, provider_id)),
        }
    }

    /// Operation types reachable through this table.
    pub fn operation_types(&self) -> impl Iterator<Item = &OperationType> {
        self.methods.values().filter_map(|e| e.operation_type.as_ref())
    }
}

/// One-shot check without a registry.
pub fn is_trigger_method(provider: &dyn ProviderClient, method: &str) -> Result<bool, ProxyError> {
    CapabilityTable::for_provider(provider).is_trigger_method(method, &provider.provider_id())
}
