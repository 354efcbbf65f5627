//! Configured model lists and admin-entered model overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::ConfigMap;
use super::operation::OperationType;

/// Model id -> human label.
pub type ModelList = BTreeMap<String, String>;

/// Admin-supplied metadata for one (provider, operation type, model) triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Extra configuration applied to calls targeting this model.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub settings: ConfigMap,
}

impl ModelOverride {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            settings: ConfigMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Label when it is present and non-empty.
    pub fn effective_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }
}

/// All overrides of one provider: operation type -> model id -> override.
pub type ProviderOverrides = BTreeMap<OperationType, BTreeMap<String, ModelOverride>>;

/// Optional model features a caller can filter configured models by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    ChatWithImageVision,
    ChatWithAudio,
    ChatWithVideo,
    ChatSystemRole,
    ChatJsonOutput,
    ChatStructuredResponse,
    ChatTools,
    ChatCombinedToolsAndStructuredResponse,
}
