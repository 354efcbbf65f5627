//! Embeddings capability trait

use async_trait::async_trait;

use super::operation::{OperationRequest, OperationTypeInterface};
use crate::error::ProviderError;
use crate::types::{EmbeddingsInput, EmbeddingsOutput};

#[async_trait]
pub trait EmbeddingsCapability: OperationTypeInterface {
    async fn embeddings(
        &self,
        request: OperationRequest<EmbeddingsInput>,
    ) -> Result<EmbeddingsOutput, ProviderError>;

    /// Vector size produced by the given model, when known.
    fn embeddings_vector_size(&self, _model_id: &str) -> Option<usize> {
        None
    }
}
