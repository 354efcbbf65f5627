//! Per-call context and lifecycle state.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::types::{Authentication, ConfigMap, OperationInput, OperationOutput, OperationType};

/// Lifecycle of one trigger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Created,
    PreDispatched,
    Invoking,
    Succeeded,
    Failed,
    PostDispatched,
    Done,
}

impl CallState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::PreDispatched => "pre_dispatched",
            Self::Invoking => "invoking",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::PostDispatched => "post_dispatched",
            Self::Done => "done",
        }
    }

    /// Whether `next` may follow `self`.
    pub const fn can_transition_to(&self, next: CallState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::PreDispatched)
                | (Self::PreDispatched, Self::Invoking)
                | (Self::PreDispatched, Self::Done)
                | (Self::PreDispatched, Self::Failed)
                | (Self::Invoking, Self::Succeeded)
                | (Self::Invoking, Self::Failed)
                | (Self::Succeeded, Self::PostDispatched)
                | (Self::PostDispatched, Self::Done)
        )
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one trigger call, owned by the dispatcher for its duration.
///
/// Pre-call observers receive it mutably and may rewrite the configuration,
/// input, tags, metadata and authentication, or force an output. The
/// correlation id, provider id, operation type and model id are fixed at
/// creation.
#[derive(Debug)]
pub struct CallContext {
    request_thread_id: Uuid,
    request_parent_id: Option<Uuid>,
    provider_id: String,
    operation_type: OperationType,
    model_id: String,
    state: CallState,
    configuration: ConfigMap,
    input: Option<OperationInput>,
    tags: Vec<String>,
    debug_data: HashMap<String, Value>,
    metadata: HashMap<String, Value>,
    authentication: Option<Authentication>,
    authentication_supplied: bool,
    // Chunk streams are Send but not Sync; the mutex keeps the context Sync.
    forced_output: Mutex<Option<OperationOutput>>,
}

impl CallContext {
    /// Fresh context with a newly minted correlation id.
    pub fn new(
        provider_id: impl Into<String>,
        operation_type: OperationType,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            request_thread_id: Uuid::new_v4(),
            request_parent_id: None,
            provider_id: provider_id.into(),
            operation_type,
            model_id: model_id.into(),
            state: CallState::Created,
            configuration: ConfigMap::new(),
            input: None,
            tags: Vec::new(),
            debug_data: HashMap::new(),
            metadata: HashMap::new(),
            authentication: None,
            authentication_supplied: false,
            forced_output: Mutex::new(None),
        }
    }

    pub fn with_parent_id(mut self, parent: Option<Uuid>) -> Self {
        self.request_parent_id = parent;
        self
    }

    pub fn with_configuration(mut self, configuration: ConfigMap) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set the input and copy its debug data.
    pub fn with_input(mut self, input: Option<OperationInput>) -> Self {
        if let Some(i) = &input {
            self.debug_data.extend(i.debug_data());
        }
        self.input = input;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Authentication already installed on the proxy; not counted as supplied.
    pub fn with_installed_authentication(mut self, authentication: Option<Authentication>) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn request_thread_id(&self) -> Uuid {
        self.request_thread_id
    }

    pub fn request_parent_id(&self) -> Option<Uuid> {
        self.request_parent_id
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn operation_type(&self) -> &OperationType {
        &self.operation_type
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn configuration(&self) -> &ConfigMap {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ConfigMap {
        &mut self.configuration
    }

    pub fn set_configuration(&mut self, configuration: ConfigMap) {
        self.configuration = configuration;
    }

    pub fn input(&self) -> Option<&OperationInput> {
        self.input.as_ref()
    }

    pub fn set_input(&mut self, input: Option<OperationInput>) {
        self.input = input;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Drop every occurrence of `tag`.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    pub fn debug_data(&self) -> &HashMap<String, Value> {
        &self.debug_data
    }

    pub fn set_debug_data(&mut self, key: impl Into<String>, value: Value) {
        self.debug_data.insert(key.into(), value);
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Attach metadata visible to post-call observers.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Supply credentials for this call; they are also installed on the proxy.
    pub fn set_authentication(&mut self, authentication: Authentication) {
        self.authentication = Some(authentication);
        self.authentication_supplied = true;
    }

    /// Credentials supplied by a pre-call observer during this call.
    pub fn supplied_authentication(&self) -> Option<&Authentication> {
        self.authentication
            .as_ref()
            .filter(|_| self.authentication_supplied)
    }

    /// Short-circuit the call: the provider and post-call observers are skipped
    /// and `output` is returned as is.
    pub fn force_output(&mut self, output: OperationOutput) {
        *self
            .forced_output
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = Some(output);
    }

    pub fn has_forced_output(&self) -> bool {
        self.forced_output
            .lock()
            .map(|forced| forced.is_some())
            .unwrap_or(false)
    }

    pub(crate) fn take_forced_output(&mut self) -> Option<OperationOutput> {
        self.forced_output
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn transition(&mut self, next: CallState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid call state transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!(
            target: "siumai_proxy::dispatch",
            request_thread_id = %self.request_thread_id,
            from = %self.state,
            to = %next,
            "call state"
        );
        self.state = next;
    }
}
