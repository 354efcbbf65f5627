//! Configurable in-process provider used by the integration tests.

#![allow(dead_code)]

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use siumai_proxy::capability::InterfaceDescriptor;
use siumai_proxy::prelude::*;
use siumai_proxy::traits::{default_interfaces, default_methods};
use uuid::Uuid;

pub const PROVIDER_ID: &str = "fake";

type FailureFactory = Box<dyn Fn() -> ProviderError + Send + Sync>;

/// What the provider saw for one invocation.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub model_id: String,
    pub tags: Vec<String>,
    pub configuration: ConfigMap,
    pub secret: Option<String>,
    pub request_thread_id: Uuid,
    pub input: Value,
}

impl RecordedRequest {
    fn from_request<I: serde::Serialize>(operation: &str, request: &OperationRequest<I>) -> Self {
        Self {
            operation: operation.to_string(),
            model_id: request.model_id.clone(),
            tags: request.tags.clone(),
            configuration: request.configuration.clone(),
            secret: request
                .authentication
                .as_ref()
                .and_then(|a| a.secret())
                .map(str::to_string),
            request_thread_id: request.request_thread_id,
            input: serde_json::to_value(&request.input).unwrap_or(Value::Null),
        }
    }
}

#[derive(Default)]
pub struct FakeProvider {
    requests: Mutex<Vec<RecordedRequest>>,
    failure: Mutex<Option<FailureFactory>>,
    delay: Option<Duration>,
    pub definition_calls: AtomicUsize,
    pub model_list_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Each invocation sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every following invocation fails with the error built by `failure`.
    pub fn fail_with<F>(&self, failure: F)
    where
        F: Fn() -> ProviderError + Send + Sync + 'static,
    {
        *self.failure.lock().unwrap() = Some(Box::new(failure));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("provider was never invoked")
    }

    async fn record<I: serde::Serialize>(
        &self,
        operation: &str,
        request: &OperationRequest<I>,
    ) -> Result<(), ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::from_request(operation, request));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock().unwrap().as_ref() {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

impl OperationTypeInterface for FakeProvider {}

#[async_trait]
impl ChatCapability for FakeProvider {
    async fn chat(&self, request: OperationRequest<ChatInput>) -> Result<ChatOutput, ProviderError> {
        self.record("chat", &request).await?;
        let last = request
            .input
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        if request.input.streamed_output {
            let chunks = last
                .split_whitespace()
                .map(|word| StreamedChatChunk::text(word.to_string()))
                .collect();
            return Ok(ChatOutput::stream(StreamedChatMessages::from_chunks(chunks)));
        }
        Ok(ChatOutput::message(
            ChatMessage::assistant(format!("echo: {last}")),
            json!({ "model": request.model_id }),
        ))
    }
}

#[async_trait]
impl EmbeddingsCapability for FakeProvider {
    async fn embeddings(
        &self,
        request: OperationRequest<EmbeddingsInput>,
    ) -> Result<EmbeddingsOutput, ProviderError> {
        self.record("embeddings", &request).await?;
        Ok(EmbeddingsOutput {
            normalized: vec![request.input.prompt.len() as f32, 1.0],
            raw: Value::Null,
        })
    }
}

#[async_trait]
impl ModerationCapability for FakeProvider {
    async fn moderation(
        &self,
        request: OperationRequest<ModerationInput>,
    ) -> Result<ModerationOutput, ProviderError> {
        self.record("moderation", &request).await?;
        Ok(ModerationOutput {
            normalized: ModerationResponse {
                flagged: request.input.prompt.contains("forbidden"),
                ..Default::default()
            },
            raw: Value::Null,
        })
    }
}

#[async_trait]
impl ProviderClient for FakeProvider {
    fn provider_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(PROVIDER_ID)
    }

    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        Some(self)
    }

    fn as_embeddings_capability(&self) -> Option<&dyn EmbeddingsCapability> {
        Some(self)
    }

    fn as_moderation_capability(&self) -> Option<&dyn ModerationCapability> {
        Some(self)
    }

    fn interfaces(&self) -> Vec<InterfaceDescriptor> {
        let mut interfaces = default_interfaces(self);
        interfaces.push(InterfaceDescriptor::operation("TranslateTextInterface"));
        interfaces.push(InterfaceDescriptor::plain("DescribeInterface"));
        interfaces
    }

    fn methods(&self) -> Vec<String> {
        let mut methods = default_methods(self);
        methods.push("translateText".to_string());
        methods.push("describe".to_string());
        methods
    }

    fn default_configuration(&self, _operation_type: &OperationType, _model_id: &str) -> ConfigMap {
        let mut defaults = ConfigMap::new();
        defaults.insert("temperature".into(), json!(1.0));
        defaults
    }

    async fn api_definition(&self) -> Result<ApiDefinition, ProviderError> {
        self.definition_calls.fetch_add(1, Ordering::SeqCst);
        let definition = json!({
            "chat": {
                "configuration": {
                    "max_tokens": { "type": "integer", "default": "256", "required": true },
                    "stop": { "type": "string", "default": "END" }
                }
            }
        });
        Ok(serde_json::from_value(definition)?)
    }

    async fn configured_models(
        &self,
        _operation_type: Option<&OperationType>,
        _capabilities: &[ModelCapability],
    ) -> Result<ModelList, ProviderError> {
        self.model_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelList::from([("m1".to_string(), "Model One".to_string())]))
    }

    async fn invoke_custom(
        &self,
        operation_type: &OperationType,
        request: OperationRequest<Option<OperationInput>>,
    ) -> Result<OperationOutput, ProviderError> {
        let input = request.input.as_ref().map(OperationInput::to_value);
        let recorded = OperationRequest {
            input: input.clone().unwrap_or(Value::Null),
            model_id: request.model_id.clone(),
            tags: request.tags.clone(),
            configuration: request.configuration.clone(),
            authentication: request.authentication.clone(),
            request_thread_id: request.request_thread_id,
        };
        self.record(operation_type.as_str(), &recorded).await?;
        Ok(OperationOutput::Custom(json!({
            "operation": operation_type.as_str(),
            "translated": input,
        })))
    }

    async fn call_method(&self, method: &str, args: Vec<Value>) -> Result<Value, ProviderError> {
        match method {
            "describe" => Ok(json!({ "provider": PROVIDER_ID, "args": args })),
            other => Err(ProviderError::MissingFeature(format!("no method {other}"))),
        }
    }
}

/// Records what each pre-call observer saw.
#[derive(Debug, Clone)]
pub struct Seen {
    pub label: &'static str,
    pub request_thread_id: Uuid,
    pub request_parent_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub input_absent: bool,
    pub configuration: ConfigMap,
}

pub struct RecordingObserver {
    pub label: &'static str,
    pub log: Arc<Mutex<Vec<Seen>>>,
}

impl RecordingObserver {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<Seen>>>) -> Arc<Self> {
        Arc::new(Self { label, log })
    }
}

#[async_trait]
impl PreCallObserver for RecordingObserver {
    async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError> {
        self.log.lock().unwrap().push(Seen {
            label: self.label,
            request_thread_id: ctx.request_thread_id(),
            request_parent_id: ctx.request_parent_id(),
            tags: ctx.tags().to_vec(),
            input_absent: ctx.input().is_none(),
            configuration: ctx.configuration().clone(),
        });
        Ok(())
    }
}

/// Counts post-call invocations.
#[derive(Default)]
pub struct CountingPostObserver {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PostCallObserver for CountingPostObserver {
    async fn on_post_call(&self, _ctx: &CallContext, output: OperationOutput) -> OperationOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        output
    }
}

pub fn proxy_for(provider: Arc<FakeProvider>) -> Proxy {
    ProxyFactory::builder().build().create(provider)
}
