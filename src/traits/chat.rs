//! Chat capability trait

use async_trait::async_trait;

use super::operation::{OperationRequest, OperationTypeInterface};
use crate::error::ProviderError;
use crate::types::{ChatInput, ChatOutput};

#[async_trait]
pub trait ChatCapability: OperationTypeInterface {
    /// Generate a chat answer. Providers honoring `input.streamed_output` return a
    /// `ChatNormalized::Stream`.
    async fn chat(&self, request: OperationRequest<ChatInput>) -> Result<ChatOutput, ProviderError>;
}
