//! Proxy
//!
//! The single call surface wrapping a provider. Trigger calls go through
//! normalization, configuration resolution and the lifecycle dispatcher;
//! metadata queries go through the metadata cache; other methods are
//! forwarded to the provider.

mod builder;
mod config;

pub use builder::{ProxyFactory, ProxyFactoryBuilder};
pub use config::ProxyConfig;

use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::cache::MetadataCache;
use crate::capability::CapabilityTable;
use crate::error::{ProviderError, ProxyError};
use crate::execution::{
    CallArg, CallContext, CallNormalizer, ConfigResolver, ErrorNormalizer, ErrorScope,
    LifecycleDispatcher,
};
use crate::traits::ProviderClient;
use crate::types::{
    ApiDefinition, Authentication, ChatInput, ChatOutput, ConfigMap, EmbeddingsInput,
    EmbeddingsOutput, ImageClassificationInput, ImageClassificationOutput, ModelCapability,
    ModelList, ModerationInput, ModerationOutput, OperationOutput, OperationType,
    SpeechToTextInput, SpeechToTextOutput, TextToSpeechInput, TextToSpeechOutput, canonical_name,
};

/// Result of [`Proxy::call`].
#[derive(Debug)]
pub enum ProxyResponse {
    /// Output of a trigger method.
    Output(OperationOutput),
    /// Return value of a plain method.
    Value(Value),
}

impl ProxyResponse {
    pub fn into_output(self) -> Option<OperationOutput> {
        match self {
            Self::Output(output) => Some(output),
            Self::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Output(_) => None,
        }
    }
}

/// A provider wrapped with the interception pipeline.
///
/// Cheap to share behind an `Arc`; concurrent calls never share per-call state.
pub struct Proxy {
    provider: Arc<dyn ProviderClient>,
    provider_id: String,
    capabilities: Arc<CapabilityTable>,
    dispatcher: LifecycleDispatcher,
    metadata: MetadataCache,
    configuration: RwLock<ConfigMap>,
    authentication: RwLock<Option<Authentication>>,
    request_parent_id: RwLock<Option<Uuid>>,
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("provider_id", &self.provider_id)
            .field("type_name", &self.capabilities.type_name())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

macro_rules! typed_operation {
    ($(#[$doc:meta])* $name:ident, $op:expr, $input:ty, $output:ty) => {
        $(#[$doc])*
        pub async fn $name(
            &self,
            input: $input,
            model_id: &str,
            tags: &[&str],
        ) -> Result<$output, ProxyError> {
            let args = vec![CallArg::from(input), CallArg::from(model_id), CallArg::from(tags.to_vec())];
            let output = self.invoke(&$op, args).await?;
            <$output>::try_from(output)
        }
    };
}

impl Proxy {
    pub(crate) fn new(
        provider: Arc<dyn ProviderClient>,
        capabilities: Arc<CapabilityTable>,
        dispatcher: LifecycleDispatcher,
        metadata: MetadataCache,
        configuration: ConfigMap,
    ) -> Self {
        let provider_id = provider.provider_id().into_owned();
        Self {
            provider,
            provider_id,
            capabilities,
            dispatcher,
            metadata,
            configuration: RwLock::new(configuration),
            authentication: RwLock::new(None),
            request_parent_id: RwLock::new(None),
        }
    }

    pub fn provider(&self) -> &Arc<dyn ProviderClient> {
        &self.provider
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Whether `method` performs a backend invocation. Unknown methods fail
    /// with `MethodNotFound`.
    pub fn is_trigger_method(&self, method: &str) -> Result<bool, ProxyError> {
        self.capabilities.is_trigger_method(method, &self.provider_id)
    }

    /// Base configuration merged into every call.
    pub fn configuration(&self) -> ConfigMap {
        self.configuration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_configuration(&self, configuration: ConfigMap) {
        *self
            .configuration
            .write()
            .unwrap_or_else(PoisonError::into_inner) = configuration;
    }

    /// Credentials passed to every call until replaced.
    pub fn authentication(&self) -> Option<Authentication> {
        self.authentication
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_authentication(&self, authentication: Authentication) {
        *self
            .authentication
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(authentication);
    }

    /// Correlation id of the call chain this proxy runs in.
    pub fn request_parent_id(&self) -> Option<Uuid> {
        *self
            .request_parent_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_request_parent_id(&self, parent: Option<Uuid>) {
        *self
            .request_parent_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = parent;
    }

    /// Call any provider method by name.
    ///
    /// Trigger methods run through the full pipeline; `api_definition` and
    /// `configured_models` are served by the metadata cache; anything else is
    /// forwarded to [`ProviderClient::call_method`].
    pub async fn call(&self, method: &str, args: Vec<CallArg>) -> Result<ProxyResponse, ProxyError> {
        let declared = self
            .capabilities
            .declared_name(method)
            .ok_or_else(|| ProxyError::method_not_found(method, &self.provider_id))?;

        if let Some(operation_type) = self.capabilities.operation_type(declared) {
            let operation_type = operation_type.clone();
            return self
                .run(&operation_type, args)
                .await
                .map(ProxyResponse::Output);
        }

        match canonical_name(declared).as_str() {
            "apidefinition" => {
                let definition = self.api_definition().await?;
                Ok(ProxyResponse::Value(serde_json::to_value(definition)?))
            }
            "configuredmodels" => {
                let (operation_type, capabilities) = configured_models_args(args)?;
                let models = self
                    .configured_models(operation_type.as_ref(), &capabilities)
                    .await?;
                Ok(ProxyResponse::Value(serde_json::to_value(models)?))
            }
            _ => {
                let values = args.into_iter().map(CallArg::into_value).collect();
                self.provider
                    .call_method(declared, values)
                    .await
                    .map(ProxyResponse::Value)
                    .map_err(|e| self.normalize_error(e))
            }
        }
    }

    /// Invoke an operation type directly.
    pub async fn invoke(
        &self,
        operation_type: &OperationType,
        args: Vec<CallArg>,
    ) -> Result<OperationOutput, ProxyError> {
        if !self
            .capabilities
            .operation_types()
            .any(|op| op == operation_type)
        {
            return Err(ProxyError::method_not_found(
                operation_type.as_str(),
                &self.provider_id,
            ));
        }
        self.run(operation_type, args).await
    }

    typed_operation!(chat, OperationType::CHAT, ChatInput, ChatOutput);
    typed_operation!(embeddings, OperationType::EMBEDDINGS, EmbeddingsInput, EmbeddingsOutput);
    typed_operation!(
        image_classification,
        OperationType::IMAGE_CLASSIFICATION,
        ImageClassificationInput,
        ImageClassificationOutput
    );
    typed_operation!(
        speech_to_text,
        OperationType::SPEECH_TO_TEXT,
        SpeechToTextInput,
        SpeechToTextOutput
    );
    typed_operation!(
        text_to_speech,
        OperationType::TEXT_TO_SPEECH,
        TextToSpeechInput,
        TextToSpeechOutput
    );
    typed_operation!(moderation, OperationType::MODERATION, ModerationInput, ModerationOutput);

    /// Provider API definition, cached after the first computation.
    pub async fn api_definition(&self) -> Result<ApiDefinition, ProxyError> {
        self.metadata
            .get_api_definition(self.provider.as_ref())
            .await
            .map_err(|e| self.normalize_error(e))
    }

    pub async fn invalidate_api_definition(&self) {
        self.metadata.invalidate_api_definition(&self.provider_id).await;
    }

    /// Native models merged with admin overrides for `operation_type`.
    pub async fn configured_models(
        &self,
        operation_type: Option<&OperationType>,
        capabilities: &[ModelCapability],
    ) -> Result<ModelList, ProxyError> {
        self.metadata
            .get_configured_models(self.provider.as_ref(), operation_type, capabilities)
            .await
            .map_err(|e| self.normalize_error(e))
    }

    async fn run(
        &self,
        operation_type: &OperationType,
        args: Vec<CallArg>,
    ) -> Result<OperationOutput, ProxyError> {
        let call = CallNormalizer.normalize(operation_type, args)?;

        let ctx = CallContext::new(&self.provider_id, operation_type.clone(), call.model_id)
            .with_parent_id(self.request_parent_id())
            .with_input(call.input)
            .with_tags(call.tags)
            .with_installed_authentication(self.authentication());

        let configuration = ConfigResolver::new(&self.metadata)
            .resolve(
                self.provider.as_ref(),
                operation_type,
                ctx.model_id(),
                &self.configuration(),
            )
            .await
            .map_err(|e| {
                let scope = ErrorScope::call(ctx.request_thread_id(), &self.provider_id, operation_type);
                ErrorNormalizer::normalize(&scope, e)
            })?;

        self.dispatcher
            .dispatch(
                self.provider.as_ref(),
                ctx.with_configuration(configuration),
                &self.authentication,
            )
            .await
    }

    fn normalize_error(&self, error: ProviderError) -> ProxyError {
        ErrorNormalizer::normalize(&ErrorScope::provider(&self.provider_id), error)
    }
}

/// `(operation type?, capabilities?)` arguments of `configured_models`.
fn configured_models_args(
    args: Vec<CallArg>,
) -> Result<(Option<OperationType>, Vec<ModelCapability>), ProxyError> {
    let mut args = args.into_iter().map(CallArg::into_value);
    let operation_type = match args.next() {
        None | Some(Value::Null) => None,
        Some(Value::String(op)) => Some(OperationType::from(op)),
        Some(other) => {
            return Err(ProxyError::bad_request(format!(
                "Operation type must be a string, got {other}"
            )));
        }
    };
    let capabilities = match args.next() {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };
    Ok((operation_type, capabilities))
}
