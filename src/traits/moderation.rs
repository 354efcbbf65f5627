//! Moderation capability trait

use async_trait::async_trait;

use super::operation::{OperationRequest, OperationTypeInterface};
use crate::error::ProviderError;
use crate::types::{ModerationInput, ModerationOutput};

#[async_trait]
pub trait ModerationCapability: OperationTypeInterface {
    async fn moderation(
        &self,
        request: OperationRequest<ModerationInput>,
    ) -> Result<ModerationOutput, ProviderError>;
}
