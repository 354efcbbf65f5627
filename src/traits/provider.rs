//! Provider client trait
//!
//! The surface the proxy needs from a provider plugin: identity, capability
//! accessors, metadata sources and the fallbacks for non-built-in calls.

use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;

use super::{
    ChatCapability, EmbeddingsCapability, ImageClassificationCapability, ModerationCapability,
    OperationRequest, SpeechToTextCapability, TextToSpeechCapability,
};
use crate::capability::InterfaceDescriptor;
use crate::error::ProviderError;
use crate::types::{
    ApiDefinition, ConfigMap, ModelCapability, ModelList, OperationInput, OperationOutput,
    OperationType,
};

/// Method names routed by the proxy itself rather than through a capability.
pub(crate) const METADATA_METHODS: [&str; 2] = ["api_definition", "configured_models"];

/// Provider plugin client.
///
/// Capability accessors follow the usual pattern: return `Some(self)` for each
/// capability trait the provider implements, `None` otherwise.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable provider identifier (`openai`, `ollama`, ...).
    fn provider_id(&self) -> Cow<'static, str>;

    /// Key under which the capability table of this provider type is shared.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        None
    }

    fn as_embeddings_capability(&self) -> Option<&dyn EmbeddingsCapability> {
        None
    }

    fn as_image_classification_capability(&self) -> Option<&dyn ImageClassificationCapability> {
        None
    }

    fn as_speech_to_text_capability(&self) -> Option<&dyn SpeechToTextCapability> {
        None
    }

    fn as_text_to_speech_capability(&self) -> Option<&dyn TextToSpeechCapability> {
        None
    }

    fn as_moderation_capability(&self) -> Option<&dyn ModerationCapability> {
        None
    }

    /// Interfaces the provider declares.
    ///
    /// Providers exposing custom operation types add an
    /// [`InterfaceDescriptor::operation`] entry here and the matching method
    /// name in [`methods`](Self::methods).
    fn interfaces(&self) -> Vec<InterfaceDescriptor> {
        default_interfaces(self)
    }

    /// Every method name callable through the proxy.
    fn methods(&self) -> Vec<String> {
        default_methods(self)
    }

    /// Provider-level configuration defaults for an operation/model pair.
    fn default_configuration(&self, _operation_type: &OperationType, _model_id: &str) -> ConfigMap {
        ConfigMap::new()
    }

    /// Configuration schema per operation type.
    async fn api_definition(&self) -> Result<ApiDefinition, ProviderError> {
        Ok(ApiDefinition::default())
    }

    /// Native model list, optionally filtered by operation type and capabilities.
    async fn configured_models(
        &self,
        operation_type: Option<&OperationType>,
        capabilities: &[ModelCapability],
    ) -> Result<ModelList, ProviderError>;

    /// Invoke a provider-declared operation type without a built-in capability trait.
    async fn invoke_custom(
        &self,
        operation_type: &OperationType,
        _request: OperationRequest<Option<OperationInput>>,
    ) -> Result<OperationOutput, ProviderError> {
        Err(ProviderError::MissingFeature(format!(
            "Provider {} does not implement operation {operation_type}",
            self.provider_id()
        )))
    }

    /// Invoke a plain (non-trigger) method.
    async fn call_method(&self, method: &str, _args: Vec<Value>) -> Result<Value, ProviderError> {
        Err(ProviderError::MissingFeature(format!(
            "Provider {} does not implement method {method}",
            self.provider_id()
        )))
    }
}

/// Interfaces derived from the `as_*_capability` accessors.
pub fn default_interfaces<P: ProviderClient + ?Sized>(provider: &P) -> Vec<InterfaceDescriptor> {
    let present = [
        (OperationType::CHAT, provider.as_chat_capability().is_some()),
        (OperationType::EMBEDDINGS, provider.as_embeddings_capability().is_some()),
        (
            OperationType::IMAGE_CLASSIFICATION,
            provider.as_image_classification_capability().is_some(),
        ),
        (
            OperationType::SPEECH_TO_TEXT,
            provider.as_speech_to_text_capability().is_some(),
        ),
        (
            OperationType::TEXT_TO_SPEECH,
            provider.as_text_to_speech_capability().is_some(),
        ),
        (OperationType::MODERATION, provider.as_moderation_capability().is_some()),
    ];

    let mut interfaces: Vec<InterfaceDescriptor> = present
        .iter()
        .filter(|(_, implemented)| *implemented)
        .map(|(op, _)| InterfaceDescriptor::for_operation(op))
        .collect();
    interfaces.push(InterfaceDescriptor::plain("ProviderClientInterface"));
    interfaces
}

/// Trigger method names of the implemented built-in capabilities, followed by
/// the metadata methods.
pub fn default_methods<P: ProviderClient + ?Sized>(provider: &P) -> Vec<String> {
    let mut methods: Vec<String> = default_interfaces(provider)
        .into_iter()
        .filter(|iface| iface.extends_operation_type)
        .filter_map(|iface| iface.operation_type().map(|op| op.as_str().to_string()))
        .collect();
    methods.extend(METADATA_METHODS.iter().map(|m| m.to_string()));
    methods
}
