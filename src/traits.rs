//! Core Trait Definitions
//!
//! Capability traits implemented by providers, the provider client surface the
//! proxy talks to, and the collaborator stores it reads from.
//!
//! - **`operation`** - the `OperationTypeInterface` marker and `OperationRequest`
//! - **`chat`**, **`embeddings`**, **`image_classification`**, **`speech`**, **`moderation`** -
//!   one capability trait per operation type
//! - **`provider`** - `ProviderClient`, with `as_*_capability` accessors
//! - **`store`** - `CacheStore` and `ModelOverrideStore` collaborators
//!
//! ## Implementing a provider
//!
//! ```rust,ignore
//! use siumai_proxy::prelude::*;
//!
//! struct Echo;
//!
//! impl OperationTypeInterface for Echo {}
//!
//! #[async_trait::async_trait]
//! impl ChatCapability for Echo {
//!     async fn chat(&self, request: OperationRequest<ChatInput>) -> Result<ChatOutput, ProviderError> {
//!         let text = request.input.messages.last().map(|m| m.content.clone()).unwrap_or_default();
//!         Ok(ChatOutput::message(ChatMessage::assistant(text), serde_json::Value::Null))
//!     }
//! }
//!
//! #[async_trait::async_trait]
//! impl ProviderClient for Echo {
//!     fn provider_id(&self) -> std::borrow::Cow<'static, str> { "echo".into() }
//!     fn as_chat_capability(&self) -> Option<&dyn ChatCapability> { Some(self) }
//!     async fn configured_models(&self, _: Option<&OperationType>, _: &[ModelCapability])
//!         -> Result<ModelList, ProviderError> { Ok(ModelList::new()) }
//! }
//! ```

mod chat;
mod embeddings;
mod image_classification;
mod moderation;
mod operation;
mod provider;
mod speech;
mod store;

pub use chat::ChatCapability;
pub use embeddings::EmbeddingsCapability;
pub use image_classification::ImageClassificationCapability;
pub use moderation::ModerationCapability;
pub use operation::{OperationRequest, OperationTypeInterface};
pub use provider::{ProviderClient, default_interfaces, default_methods};
pub use speech::{SpeechToTextCapability, TextToSpeechCapability};
pub use store::{CacheStore, CacheTtl, ModelOverrideStore};
