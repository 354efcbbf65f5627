//! Operation-type marker and the per-call request handed to providers.

use uuid::Uuid;

use crate::types::{Authentication, ConfigMap};

/// Marker extended by every capability trait that performs a real backend invocation.
///
/// Plumbing traits (configuration, listing, ...) must not extend it.
pub trait OperationTypeInterface: Send + Sync {}

/// Finalized arguments of one trigger call.
///
/// Everything here is call-scoped: concurrent calls on one provider each get
/// their own request, so providers never observe another call's tags or configuration.
#[derive(Debug, Clone)]
pub struct OperationRequest<I> {
    pub input: I,
    pub model_id: String,
    pub tags: Vec<String>,
    pub configuration: ConfigMap,
    pub authentication: Option<Authentication>,
    /// Correlation id of the call.
    pub request_thread_id: Uuid,
}

impl<I> OperationRequest<I> {
    /// Swap the input while keeping the rest of the request.
    pub fn with_input<J>(self, input: J) -> OperationRequest<J> {
        OperationRequest {
            input,
            model_id: self.model_id,
            tags: self.tags,
            configuration: self.configuration,
            authentication: self.authentication,
            request_thread_id: self.request_thread_id,
        }
    }
}
