//! Tracing observer

use async_trait::async_trait;

use super::{PostCallObserver, PreCallObserver};
use crate::error::ProxyError;
use crate::execution::CallContext;
use crate::types::OperationOutput;

/// Logs call start and completion at debug level.
///
/// Payloads are never logged; authentication is reported by kind only.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    log_configuration: bool,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log configuration keys (never values).
    pub fn with_configuration_keys(mut self, enabled: bool) -> Self {
        self.log_configuration = enabled;
        self
    }
}

#[async_trait]
impl PreCallObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError> {
        let config_keys = self
            .log_configuration
            .then(|| ctx.configuration().keys().cloned().collect::<Vec<_>>().join(","));
        tracing::debug!(
            target: "siumai_proxy::observer",
            request_thread_id = %ctx.request_thread_id(),
            request_parent_id = ?ctx.request_parent_id(),
            provider = %ctx.provider_id(),
            operation = %ctx.operation_type(),
            model = %ctx.model_id(),
            tags = ?ctx.tags(),
            authentication = ctx.authentication().map(|a| a.kind_name()).unwrap_or("none"),
            config_keys = config_keys.as_deref().unwrap_or(""),
            "calling provider"
        );
        Ok(())
    }
}

#[async_trait]
impl PostCallObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn on_post_call(&self, ctx: &CallContext, output: OperationOutput) -> OperationOutput {
        tracing::debug!(
            target: "siumai_proxy::observer",
            request_thread_id = %ctx.request_thread_id(),
            provider = %ctx.provider_id(),
            operation = %ctx.operation_type(),
            output = output.kind_name(),
            streamed = output.is_stream(),
            metadata_keys = ctx.metadata().len(),
            "provider call completed"
        );
        output
    }
}
