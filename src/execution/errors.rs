//! Error normalization at the invocation boundary.

use uuid::Uuid;

use crate::error::{ProviderError, ProxyError};
use crate::types::OperationType;

/// Where a failure happened, for the log line.
#[derive(Debug, Clone, Copy)]
pub struct ErrorScope<'a> {
    pub request_thread_id: Option<Uuid>,
    pub provider_id: &'a str,
    pub operation_type: Option<&'a OperationType>,
}

impl<'a> ErrorScope<'a> {
    pub fn call(request_thread_id: Uuid, provider_id: &'a str, operation_type: &'a OperationType) -> Self {
        Self {
            request_thread_id: Some(request_thread_id),
            provider_id,
            operation_type: Some(operation_type),
        }
    }

    /// Scope of a non-trigger call (metadata queries, plain methods).
    pub fn provider(provider_id: &'a str) -> Self {
        Self {
            request_thread_id: None,
            provider_id,
            operation_type: None,
        }
    }
}

/// Maps raw provider errors into [`ProxyError`] and logs each one once.
pub struct ErrorNormalizer;

impl ErrorNormalizer {
    /// Pure mapping, no logging.
    pub fn classify(error: ProviderError) -> ProxyError {
        match error {
            ProviderError::Client { message, .. } => {
                ProxyError::BadRequest(format!("Error invoking client: {message}"))
            }
            ProviderError::Response(m) => ProxyError::ResponseError(m),
            ProviderError::MissingFeature(m) => ProxyError::MissingFeature(m),
            ProviderError::Quota(m) => ProxyError::QuotaExceeded(m),
            ProviderError::RateLimit(m) => ProxyError::RateLimited(m),
            ProviderError::UnsafePrompt(m) => ProxyError::UnsafeContent(m),
            ProviderError::Request(m) => ProxyError::RequestError(m),
            ProviderError::Proxy(e) => e,
            other @ (ProviderError::Transport(_)
            | ProviderError::Cancelled(_)
            | ProviderError::Other(_)) => {
                ProxyError::RequestError(format!("Error invoking model response: {other}"))
            }
        }
    }

    /// Classify `error`, log it at error level and return the typed failure.
    pub fn normalize(scope: &ErrorScope<'_>, error: ProviderError) -> ProxyError {
        let status = match &error {
            ProviderError::Client { status, .. } => *status,
            _ => None,
        };
        let failure = Self::classify(error);
        let request_thread_id = scope.request_thread_id.map(|id| id.to_string());
        tracing::error!(
            target: "siumai_proxy",
            request_thread_id = request_thread_id.as_deref().unwrap_or("-"),
            provider = %scope.provider_id,
            operation = scope.operation_type.map(OperationType::as_str).unwrap_or("-"),
            kind = %failure.kind(),
            status = ?status,
            "{failure}"
        );
        failure
    }
}
