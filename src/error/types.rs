//! Closed failure taxonomy surfaced to proxy callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable failure kind. Callers branch on this, not on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BadRequest,
    MissingFeature,
    QuotaExceeded,
    RateLimited,
    UnsafeContent,
    ResponseError,
    RequestError,
    MethodNotFound,
}

impl FailureKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::MissingFeature => "missing_feature",
            Self::QuotaExceeded => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::UnsafeContent => "unsafe_content",
            Self::ResponseError => "response_error",
            Self::RequestError => "request_error",
            Self::MethodNotFound => "method_not_found",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure returned by every proxy entry point.
///
/// The wrapped string is the human-readable message; for failures raised by a
/// provider it preserves the provider's original message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxyError {
    /// Malformed call shape (missing model id, wrong argument count, input mismatch).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider lacks the requested capability or feature.
    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Content-safety rejection.
    #[error("Unsafe content: {0}")]
    UnsafeContent(String),

    /// The provider returned a malformed or unusable response.
    #[error("Response error: {0}")]
    ResponseError(String),

    /// Catch-all: transport failures and unrecognized provider errors.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The requested method does not exist on the provider.
    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

impl ProxyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::BadRequest(_) => FailureKind::BadRequest,
            Self::MissingFeature(_) => FailureKind::MissingFeature,
            Self::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            Self::RateLimited(_) => FailureKind::RateLimited,
            Self::UnsafeContent(_) => FailureKind::UnsafeContent,
            Self::ResponseError(_) => FailureKind::ResponseError,
            Self::RequestError(_) => FailureKind::RequestError,
            Self::MethodNotFound(_) => FailureKind::MethodNotFound,
        }
    }

    /// The message carried by the failure, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::MissingFeature(m)
            | Self::QuotaExceeded(m)
            | Self::RateLimited(m)
            | Self::UnsafeContent(m)
            | Self::ResponseError(m)
            | Self::RequestError(m)
            | Self::MethodNotFound(m) => m,
        }
    }

    /// Rate limit and quota failures are meant to be retried by the caller with backoff.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::QuotaExceeded(_))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn missing_feature(message: impl Into<String>) -> Self {
        Self::MissingFeature(message.into())
    }

    pub fn method_not_found(method: &str, provider_id: &str) -> Self {
        Self::MethodNotFound(format!(
            "Method {method} does not exist on provider {provider_id}"
        ))
    }
}
