//! Error Handling Module
//!
//! Two error families live here:
//! - `ProviderError`: the open set of failures a provider implementation may return
//! - `ProxyError`: the closed set of failure kinds surfaced to callers of a `Proxy`
//!
//! Provider errors never reach callers directly; the error normalizer in
//! `crate::execution::errors` converts them at the invocation boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_proxy::error::{FailureKind, ProxyError};
//!
//! let error = ProxyError::RateLimited("slow down".into());
//! assert_eq!(error.kind(), FailureKind::RateLimited);
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod provider;
pub mod types;

pub use provider::ProviderError;
pub use types::*;
