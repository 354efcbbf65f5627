//! Call observers
//!
//! Pre-call observers run before the provider is invoked and may rewrite the
//! call; post-call observers run after a successful invocation and may replace
//! the output. Both run in registration order.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ProxyError;
use crate::execution::CallContext;
use crate::types::OperationOutput;

pub mod logging;

pub use logging::TracingObserver;

#[async_trait]
pub trait PreCallObserver: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "pre_call_observer"
    }

    /// Inspect or rewrite the call. Returning an error aborts the call before
    /// the provider is invoked.
    async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError>;
}

#[async_trait]
pub trait PostCallObserver: Send + Sync {
    fn name(&self) -> &str {
        "post_call_observer"
    }

    /// Inspect or replace the output of a successful call.
    async fn on_post_call(&self, ctx: &CallContext, output: OperationOutput) -> OperationOutput;
}

/// Run pre-call observers in registration order, stopping at the first error
/// or forced output.
pub async fn apply_pre_call_chain(
    observers: &[Arc<dyn PreCallObserver>],
    ctx: &mut CallContext,
) -> Result<(), ProxyError> {
    for observer in observers {
        observer.on_pre_call(ctx).await?;
        if ctx.has_forced_output() {
            tracing::debug!(
                target: "siumai_proxy::dispatch",
                request_thread_id = %ctx.request_thread_id(),
                observer = observer.name(),
                "pre-call observer forced the output"
            );
            break;
        }
    }
    Ok(())
}

/// Run post-call observers in registration order; each receives the previous output.
pub async fn apply_post_call_chain(
    observers: &[Arc<dyn PostCallObserver>],
    ctx: &CallContext,
    mut output: OperationOutput,
) -> OperationOutput {
    for observer in observers {
        output = observer.on_post_call(ctx, output).await;
    }
    output
}
