//! Operation type -> typed invoker.
//!
//! Built-in operation types are routed to their capability trait; anything
//! else falls back to [`ProviderClient::invoke_custom`].

use futures::future::BoxFuture;
use std::collections::HashMap;

use crate::error::ProviderError;
use crate::traits::{OperationRequest, ProviderClient};
use crate::types::{
    ChatInput, EmbeddingsInput, FromOperationInput, ImageClassificationInput, ModerationInput,
    OperationInput, OperationOutput, OperationType, SpeechToTextInput, TextToSpeechInput,
};

pub type InvokeFuture<'a> = BoxFuture<'a, Result<OperationOutput, ProviderError>>;

/// Invokes one operation type on a provider.
pub type Invoker = for<'a> fn(
    &'a dyn ProviderClient,
    OperationRequest<Option<OperationInput>>,
) -> InvokeFuture<'a>;

fn missing_capability(provider: &dyn ProviderClient, operation_type: &OperationType) -> ProviderError {
    ProviderError::MissingFeature(format!(
        "Provider {} does not support {operation_type}",
        provider.provider_id()
    ))
}

macro_rules! capability_invoker {
    ($name:ident, $op:expr, $accessor:ident, $method:ident, $input:ty) => {
        fn $name<'a>(
            provider: &'a dyn ProviderClient,
            mut request: OperationRequest<Option<OperationInput>>,
        ) -> InvokeFuture<'a> {
            Box::pin(async move {
                let capability = provider
                    .$accessor()
                    .ok_or_else(|| missing_capability(provider, &$op))?;
                let input = <$input>::from_operation_input(request.input.take())?;
                let output = capability.$method(request.with_input(input)).await?;
                Ok::<_, ProviderError>(OperationOutput::from(output))
            })
        }
    };
}

capability_invoker!(invoke_chat, OperationType::CHAT, as_chat_capability, chat, ChatInput);
capability_invoker!(
    invoke_embeddings,
    OperationType::EMBEDDINGS,
    as_embeddings_capability,
    embeddings,
    EmbeddingsInput
);
capability_invoker!(
    invoke_image_classification,
    OperationType::IMAGE_CLASSIFICATION,
    as_image_classification_capability,
    image_classification,
    ImageClassificationInput
);
capability_invoker!(
    invoke_speech_to_text,
    OperationType::SPEECH_TO_TEXT,
    as_speech_to_text_capability,
    speech_to_text,
    SpeechToTextInput
);
capability_invoker!(
    invoke_text_to_speech,
    OperationType::TEXT_TO_SPEECH,
    as_text_to_speech_capability,
    text_to_speech,
    TextToSpeechInput
);
capability_invoker!(
    invoke_moderation,
    OperationType::MODERATION,
    as_moderation_capability,
    moderation,
    ModerationInput
);

#[derive(Clone)]
pub struct DispatchTable {
    invokers: HashMap<OperationType, Invoker>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ops: Vec<&str> = self.invokers.keys().map(OperationType::as_str).collect();
        ops.sort_unstable();
        f.debug_struct("DispatchTable").field("operations", &ops).finish()
    }
}

impl DispatchTable {
    /// Table routing the six built-in operation types.
    pub fn builtin() -> Self {
        let mut invokers: HashMap<OperationType, Invoker> = HashMap::new();
        invokers.insert(OperationType::CHAT, invoke_chat);
        invokers.insert(OperationType::EMBEDDINGS, invoke_embeddings);
        invokers.insert(OperationType::IMAGE_CLASSIFICATION, invoke_image_classification);
        invokers.insert(OperationType::SPEECH_TO_TEXT, invoke_speech_to_text);
        invokers.insert(OperationType::TEXT_TO_SPEECH, invoke_text_to_speech);
        invokers.insert(OperationType::MODERATION, invoke_moderation);
        Self { invokers }
    }

    /// Route an extra operation type to a dedicated invoker instead of `invoke_custom`.
    pub fn with_invoker(mut self, operation_type: OperationType, invoker: Invoker) -> Self {
        self.invokers.insert(operation_type, invoker);
        self
    }

    pub fn contains(&self, operation_type: &OperationType) -> bool {
        self.invokers.contains_key(operation_type)
    }

    pub fn invoke<'a>(
        &self,
        provider: &'a dyn ProviderClient,
        operation_type: &OperationType,
        request: OperationRequest<Option<OperationInput>>,
    ) -> InvokeFuture<'a> {
        match self.invokers.get(operation_type) {
            Some(invoker) => invoker(provider, request),
            None => {
                let operation_type = operation_type.clone();
                Box::pin(async move { provider.invoke_custom(&operation_type, request).await })
            }
        }
    }
}
