//! Raw provider failures.
//!
//! Provider implementations return `ProviderError`; the set is open through
//! `ProviderError::Other`, which accepts any boxed error.

use std::error::Error as StdError;

use thiserror::Error;

use super::types::ProxyError;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP client rejected the request (4xx-style client failure).
    #[error("{message}")]
    Client { status: Option<u16>, message: String },

    /// Connection or transport failure before a response arrived.
    #[error("{0}")]
    Transport(String),

    /// The backend answered with something unusable.
    #[error("{0}")]
    Response(String),

    #[error("{0}")]
    MissingFeature(String),

    #[error("{0}")]
    Quota(String),

    #[error("{0}")]
    RateLimit(String),

    /// The backend refused the prompt for safety reasons.
    #[error("{0}")]
    UnsafePrompt(String),

    #[error("{0}")]
    Request(String),

    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Already normalized upstream (e.g. by a nested proxy).
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl ProviderError {
    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::Client {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn other<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}
