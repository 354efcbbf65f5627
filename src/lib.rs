//! # siumai-proxy - Uniform Call Interception for Model Providers
//!
//! Wraps heterogeneous model-provider plugins behind one call surface so that
//! observation, configuration merging, authentication injection, error
//! normalization, metadata caching and stream correlation apply the same way to
//! every provider and every capability.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Capability Introspection**: trigger methods are recognized from the capability
//!   interfaces a provider declares, computed once per provider type.
//! - **Call Normalization**: any `(input, model, tags)` shaped call becomes one canonical triple.
//! - **Observer Pipeline**: pre-call observers may rewrite the call, post-call observers may
//!   replace the output; both run in registration order.
//! - **Closed Failure Taxonomy**: provider errors are mapped to a fixed set of `ProxyError`
//!   kinds and logged once at the boundary.
//! - **Metadata Cache**: API definitions are cached; configured model lists are merged with
//!   admin overrides on every query.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use siumai_proxy::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ProxyError> {
//!     let factory = ProxyFactory::builder()
//!         .with_observer(Arc::new(TracingObserver::new()))
//!         .build();
//!     let proxy = factory.create(Arc::new(MyProvider::default()));
//!
//!     let answer = proxy
//!         .chat(ChatInput::new(vec![ChatMessage::user("Hello")]), "my-model", &["greeting"])
//!         .await?;
//!     println!("{}", answer.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod capability;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod observability;
pub mod observers;
pub mod proxy;
pub mod streaming;
pub mod traits;
pub mod types;

pub use error::{FailureKind, ProviderError, ProxyError};
pub use proxy::{Proxy, ProxyConfig, ProxyFactory, ProxyFactoryBuilder, ProxyResponse};

pub mod prelude {
    pub use crate::cache::{MemoryCacheStore, MemoryOverrideStore, MetadataCache};
    pub use crate::capability::{
        CapabilityRegistry, CapabilityTable, InterfaceDescriptor, install_global_registry,
    };
    pub use crate::error::{FailureKind, ProviderError, ProxyError};
    pub use crate::execution::{CallArg, CallContext, CallState};
    pub use crate::observers::{PostCallObserver, PreCallObserver, TracingObserver};
    pub use crate::proxy::{Proxy, ProxyConfig, ProxyFactory, ProxyResponse};
    pub use crate::streaming::{StreamMetadata, StreamedChatChunk, StreamedChatMessages};
    pub use crate::traits::{
        CacheStore, CacheTtl, ChatCapability, EmbeddingsCapability, ImageClassificationCapability,
        ModelOverrideStore, ModerationCapability, OperationRequest, OperationTypeInterface,
        ProviderClient, SpeechToTextCapability, TextToSpeechCapability,
    };
    pub use crate::types::*;
}
