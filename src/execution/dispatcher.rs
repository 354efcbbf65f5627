//! Lifecycle dispatcher: pre observers, invocation, post observers.

use std::sync::{Arc, PoisonError, RwLock};

use super::context::{CallContext, CallState};
use super::dispatch_table::DispatchTable;
use super::errors::{ErrorNormalizer, ErrorScope};
use crate::error::ProxyError;
use crate::observers::{
    PostCallObserver, PreCallObserver, apply_post_call_chain, apply_pre_call_chain,
};
use crate::streaming::StreamMetadata;
use crate::traits::{OperationRequest, ProviderClient};
use crate::types::{Authentication, OperationOutput};

/// Drives one call through `Created -> PreDispatched -> Invoking ->
/// Succeeded | Failed -> PostDispatched -> Done`.
#[derive(Clone, Default)]
pub struct LifecycleDispatcher {
    pre_observers: Vec<Arc<dyn PreCallObserver>>,
    post_observers: Vec<Arc<dyn PostCallObserver>>,
    table: Arc<DispatchTable>,
}

impl std::fmt::Debug for LifecycleDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDispatcher")
            .field("pre_observers", &self.pre_observers.len())
            .field("post_observers", &self.post_observers.len())
            .field("table", &self.table)
            .finish()
    }
}

impl LifecycleDispatcher {
    pub fn new(
        pre_observers: Vec<Arc<dyn PreCallObserver>>,
        post_observers: Vec<Arc<dyn PostCallObserver>>,
        table: Arc<DispatchTable>,
    ) -> Self {
        Self {
            pre_observers,
            post_observers,
            table,
        }
    }

    pub fn pre_observers(&self) -> &[Arc<dyn PreCallObserver>] {
        &self.pre_observers
    }

    pub fn post_observers(&self) -> &[Arc<dyn PostCallObserver>] {
        &self.post_observers
    }

    /// Run the call described by `ctx` against `provider`.
    ///
    /// Authentication supplied by a pre-call observer is written to
    /// `installed_authentication` before invocation. Provider failures are
    /// normalized and logged once; post-call observers only see successes.
    pub async fn dispatch(
        &self,
        provider: &dyn ProviderClient,
        mut ctx: CallContext,
        installed_authentication: &RwLock<Option<Authentication>>,
    ) -> Result<OperationOutput, ProxyError> {
        debug_assert_eq!(ctx.state(), CallState::Created);

        if let Err(e) = apply_pre_call_chain(&self.pre_observers, &mut ctx).await {
            ctx.transition(CallState::PreDispatched);
            ctx.transition(CallState::Failed);
            return Err(e);
        }
        ctx.transition(CallState::PreDispatched);

        if let Some(forced) = ctx.take_forced_output() {
            ctx.transition(CallState::Done);
            return Ok(forced);
        }

        if let Some(auth) = ctx.supplied_authentication() {
            *installed_authentication
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(auth.clone());
        }

        let request = OperationRequest {
            input: ctx.input().cloned(),
            model_id: ctx.model_id().to_string(),
            tags: ctx.tags().to_vec(),
            configuration: ctx.configuration().clone(),
            authentication: ctx.authentication().cloned(),
            request_thread_id: ctx.request_thread_id(),
        };

        ctx.transition(CallState::Invoking);
        let output = match self
            .table
            .invoke(provider, ctx.operation_type(), request)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                ctx.transition(CallState::Failed);
                let scope = ErrorScope::call(
                    ctx.request_thread_id(),
                    ctx.provider_id(),
                    ctx.operation_type(),
                );
                return Err(ErrorNormalizer::normalize(&scope, e));
            }
        };
        ctx.transition(CallState::Succeeded);

        let mut output = apply_post_call_chain(&self.post_observers, &ctx, output).await;
        ctx.transition(CallState::PostDispatched);

        if let Some(stream) = output.stream_mut() {
            stream.set_metadata(StreamMetadata {
                request_thread_id: Some(ctx.request_thread_id()),
                request_parent_id: ctx.request_parent_id(),
                provider_id: Some(ctx.provider_id().to_string()),
                model_id: Some(ctx.model_id().to_string()),
                input: ctx.input().map(|i| i.to_value()),
                configuration: Some(ctx.configuration().clone()),
                tags: ctx.tags().to_vec(),
            });
        }
        ctx.transition(CallState::Done);

        Ok(output)
    }
}
